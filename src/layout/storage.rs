//! Storage mode selection for constraint groups
//!
//! The mode follows the host's capability and is decided once per process:
//! the first detection wins and every later group reuses it. A group is
//! never created in a mode its host does not support.

use once_cell::sync::OnceCell;
use serde::Deserialize;

use super::error::LayoutError;
use super::host::LayoutHost;

/// How a [`ConstraintGroup`](super::group::ConstraintGroup) keeps its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Raw handles toggled through the host's active flag
    Direct,
    /// Handles installed on their attachment point (closest common ancestor)
    Tracked,
}

static SELECTED_MODE: OnceCell<StorageMode> = OnceCell::new();

impl StorageMode {
    /// Map the host's capability onto a mode, without touching process state
    pub fn detect<H: LayoutHost + ?Sized>(host: &H) -> Self {
        if host.supports_active_flag() {
            Self::Direct
        } else {
            Self::Tracked
        }
    }

    /// The process-wide mode, detected from `host` on first use
    pub fn selected<H: LayoutHost + ?Sized>(host: &H) -> Self {
        *SELECTED_MODE.get_or_init(|| {
            let mode = Self::detect(host);
            log::info!("constraint storage mode selected: {:?}", mode);
            mode
        })
    }

    /// Mode for a new group on `host`: `pinned` if given, otherwise the
    /// process-wide selection. Either way it must match what the host supports.
    pub fn resolve<H: LayoutHost + ?Sized>(
        host: &H,
        pinned: Option<StorageMode>,
    ) -> Result<Self, LayoutError> {
        let supported = Self::detect(host);
        let requested = pinned.unwrap_or_else(|| Self::selected(host));
        if requested != supported {
            return Err(LayoutError::unsupported_mode(requested, supported));
        }
        Ok(requested)
    }

    /// The process-wide mode, if one has been selected yet
    pub fn current() -> Option<Self> {
        SELECTED_MODE.get().copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Tracked => "tracked",
        }
    }
}
