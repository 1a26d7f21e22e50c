//! Scene files: a view tree plus a sequence of layout passes
//!
//! A scene is a TOML document describing an in-memory [`ViewTree`] and the
//! statements to lay it out with. Each pass runs as one keyed session over
//! every view and replaces the group of the pass before it, so a scene walks
//! through the whole lifecycle of a constraint group.
//!
//! ```toml
//! [settings]
//! mode = "tracked"
//! active_flag = false
//!
//! [[view]]
//! name = "root"
//! frame = [0, 0, 320, 480]
//! margins = 16
//!
//! [[view]]
//! name = "card"
//! parent = "root"
//!
//! [[pass]]
//! name = "inset"
//! layout = "card.edges = root.edges_within_margins"
//! ```

use std::fmt::Write as _;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ParseError;
use crate::layout::{
    clear_constraints, clear_layout, replace, resolve_statements, Frame, HostGroup, Insets,
    LayoutError, LayoutSession, SessionConfig, StorageMode, ViewId, ViewTree,
};
use crate::parser::parse;

/// Errors that can occur when loading or running scenes
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scene TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("view '{0}' is defined twice")]
    DuplicateView(String),

    #[error("view '{view}' names unknown parent '{parent}'")]
    UnknownParent { view: String, parent: String },

    #[error("mode '{}' does not match the tree, which supports '{}'", .mode.name(), .supported.name())]
    UnsupportedMode {
        mode: StorageMode,
        supported: StorageMode,
    },

    #[error("pass '{pass}': {} syntax error(s)", .errors.len())]
    Syntax {
        pass: String,
        layout: String,
        errors: Vec<ParseError>,
    },

    #[error("pass '{pass}': {source}")]
    Layout {
        pass: String,
        #[source]
        source: LayoutError,
    },
}

impl SceneError {
    /// Human-readable report, with source excerpts for syntax errors
    pub fn format(&self, filename: &str) -> String {
        match self {
            SceneError::Syntax { layout, errors, .. } => errors
                .iter()
                .map(|e| e.format(layout, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            SceneError::Layout { source, .. } => match source.suggestions() {
                Some(suggestions) if !suggestions.is_empty() => {
                    format!("{}\n  did you mean: {}?", self, suggestions.join(", "))
                }
                _ => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

/// Scene-wide settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Pin the storage mode instead of detecting it from the tree; it must
    /// still match what the tree supports
    pub mode: Option<StorageMode>,
    /// Whether the tree supports the bulk active flag
    pub active_flag: Option<bool>,
    /// Skip layout refreshes in every pass
    pub constraints_only: bool,
}

/// Uniform margins or `[top, leading, bottom, trailing]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MarginSpec {
    Uniform(f64),
    Edges([f64; 4]),
}

impl From<MarginSpec> for Insets {
    fn from(spec: MarginSpec) -> Self {
        match spec {
            MarginSpec::Uniform(value) => Insets::uniform(value),
            MarginSpec::Edges([top, leading, bottom, trailing]) => {
                Insets::new(top, leading, bottom, trailing)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSpec {
    pub name: String,
    pub parent: Option<String>,
    /// `[x, y, width, height]`
    pub frame: Option<[f64; 4]>,
    pub margins: Option<MarginSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassSpec {
    pub name: String,
    /// Layout statements for this pass
    #[serde(default)]
    pub layout: String,
    /// Activate without refreshing
    #[serde(default)]
    pub constraints_only: bool,
    /// Only deactivate the previous pass's group
    #[serde(default)]
    pub clear: bool,
}

/// A parsed scene file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(rename = "view", default)]
    pub views: Vec<ViewSpec>,
    #[serde(rename = "pass", default)]
    pub passes: Vec<PassSpec>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the view tree. Parents must be declared before their subviews.
    pub fn build_tree(&self) -> Result<(ViewTree, IndexMap<String, ViewId>), SceneError> {
        let mut tree = match self.settings.active_flag {
            Some(false) => ViewTree::without_active_flag(),
            _ => ViewTree::new(),
        };
        let supported = StorageMode::detect(&tree);
        if let Some(mode) = self.settings.mode.filter(|&mode| mode != supported) {
            return Err(SceneError::UnsupportedMode { mode, supported });
        }
        let mut views = IndexMap::new();
        for spec in &self.views {
            if views.contains_key(&spec.name) {
                return Err(SceneError::DuplicateView(spec.name.clone()));
            }
            let parent = match &spec.parent {
                Some(parent) => Some(*views.get(parent).ok_or_else(|| {
                    SceneError::UnknownParent {
                        view: spec.name.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };
            let view = tree.add_view(spec.name.clone(), parent);
            if let Some([x, y, width, height]) = spec.frame {
                tree.set_frame(view, Frame::new(x, y, width, height));
            }
            if let Some(margins) = spec.margins {
                tree.set_margins(view, margins.into());
            }
            views.insert(spec.name.clone(), view);
        }
        Ok((tree, views))
    }

    /// Build the tree and run every pass in order
    pub fn run(&self) -> Result<SceneReport, SceneError> {
        let (mut tree, views) = self.build_tree()?;
        let mode = self
            .settings
            .mode
            .unwrap_or_else(|| StorageMode::detect(&tree));
        log::debug!(
            "running scene: {} view(s), {} pass(es), mode={}",
            views.len(),
            self.passes.len(),
            mode.name()
        );

        let mut previous: Option<HostGroup<ViewTree>> = None;
        let mut passes = Vec::with_capacity(self.passes.len());
        for pass in &self.passes {
            let perform_layout = !(pass.constraints_only || self.settings.constraints_only);

            if pass.clear {
                if let Some(old) = previous.take() {
                    if perform_layout {
                        clear_layout(&mut tree, &old);
                    } else {
                        clear_constraints(&mut tree, &old);
                    }
                    old.release(&mut tree);
                }
                passes.push(PassReport::capture(&tree, &views, &pass.name, None));
                continue;
            }

            let doc = parse(&pass.layout).map_err(|errors| SceneError::Syntax {
                pass: pass.name.clone(),
                layout: pass.layout.clone(),
                errors,
            })?;
            let layout_error = |source| SceneError::Layout {
                pass: pass.name.clone(),
                source,
            };
            let declarations = resolve_statements(&tree, &views, &doc).map_err(layout_error)?;

            let config = SessionConfig::new()
                .with_perform_layout(perform_layout)
                .with_storage_mode(mode);
            let mut session = LayoutSession::new(&mut tree, config);
            if let Some(old) = &previous {
                session = session.replacing(old);
            }
            let mut unbound = None;
            let group = session
                .keyed(&views, |proxies| {
                    for declaration in &declarations {
                        if let Err(err) = declaration.declare(proxies) {
                            unbound.get_or_insert(err);
                        }
                    }
                })
                .map_err(layout_error)?;

            if let Some(err) = unbound {
                // put the previous pass back before dropping the partial group
                match &previous {
                    Some(old) => replace(&mut tree, &group, old, perform_layout),
                    None => group.deactivate(&mut tree, perform_layout),
                }
                group.release(&mut tree);
                return Err(layout_error(err));
            }

            passes.push(PassReport::capture(&tree, &views, &pass.name, Some(&group)));
            if let Some(old) = previous.replace(group) {
                old.release(&mut tree);
            }
        }
        Ok(SceneReport { passes })
    }
}

/// State of the tree after one pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub name: String,
    /// Mode of the pass's group; `None` for clearing passes
    pub mode: Option<StorageMode>,
    pub constraints: usize,
    pub active: bool,
    /// Constraints the last refresh dropped as unsatisfiable
    pub unsatisfied: usize,
    pub frames: Vec<(String, Frame)>,
}

impl PassReport {
    fn capture(
        tree: &ViewTree,
        views: &IndexMap<String, ViewId>,
        name: &str,
        group: Option<&HostGroup<ViewTree>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            mode: group.map(|g| g.mode()),
            constraints: group.map_or(0, |g| g.len()),
            active: group.is_some_and(|g| g.is_active(tree)),
            unsatisfied: tree.unsatisfied().len(),
            frames: views
                .iter()
                .map(|(name, &view)| (name.clone(), tree.frame(view)))
                .collect(),
        }
    }
}

/// Result of running a scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReport {
    pub passes: Vec<PassReport>,
}

impl SceneReport {
    /// Plain-text report: one header per pass followed by every frame
    pub fn render(&self) -> String {
        let width = self
            .passes
            .iter()
            .flat_map(|p| p.frames.iter().map(|(name, _)| name.len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for pass in &self.passes {
            match pass.mode {
                Some(mode) => {
                    let _ = write!(
                        out,
                        "pass {}: {} constraint(s), {}, mode={}",
                        pass.name,
                        pass.constraints,
                        if pass.active { "active" } else { "inactive" },
                        mode.name()
                    );
                }
                None => {
                    let _ = write!(out, "pass {}: cleared", pass.name);
                }
            }
            if pass.unsatisfied > 0 {
                let _ = write!(out, ", {} unsatisfied", pass.unsatisfied);
            }
            out.push('\n');
            for (name, frame) in &pass.frames {
                let _ = writeln!(out, "  {:<width$}  {}", name, frame, width = width);
            }
        }
        out
    }
}
