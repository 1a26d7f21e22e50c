//! Layout DSL CLI
//!
//! Usage:
//!   layout-dsl [OPTIONS] [FILE]
//!
//! Options:
//!   -m, --mode <MODE>        Pin the constraint storage mode (direct, tracked)
//!   -c, --constraints-only   Activate constraints without refreshing layout
//!   -v, --verbose            Raise the log level (repeat for more)
//!   -h, --help               Print help

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use layout_dsl::{Scene, StorageMode};

#[derive(Parser)]
#[command(name = "layout-dsl")]
#[command(about = "Run a layout scene and print the resulting frames")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Pin the constraint storage mode instead of detecting it. Scenes that
    /// leave `active_flag` unset get a tree supporting the pinned mode.
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Activate constraints without refreshing layout
    #[arg(short, long)]
    constraints_only: bool,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Direct,
    Tracked,
}

impl From<ModeArg> for StorageMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => StorageMode::Direct,
            ModeArg::Tracked => StorageMode::Tracked,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // If no input file and stdin is a terminal (interactive), show usage
    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("usage: layout-dsl [--mode direct|tracked] [--constraints-only] [-v] [FILE]");
        eprintln!("       cat scene.toml | layout-dsl");
        std::process::exit(1);
    }

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let loaded = match &cli.input {
        Some(path) => Scene::from_file(path),
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => Scene::from_str(&buffer),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };
    let mut scene = match loaded {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error loading scene '{}': {}", filename, e);
            std::process::exit(1);
        }
    };

    if let Some(mode) = cli.mode {
        let mode = StorageMode::from(mode);
        scene.settings.mode = Some(mode);
        if scene.settings.active_flag.is_none() {
            scene.settings.active_flag = Some(mode == StorageMode::Direct);
        }
    }
    if cli.constraints_only {
        scene.settings.constraints_only = true;
    }

    match scene.run() {
        Ok(report) => print!("{}", report.render()),
        Err(e) => {
            eprintln!("Error: {}", e.format(&filename));
            std::process::exit(1);
        }
    }
}
