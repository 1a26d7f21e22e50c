//! Configuration for layout sessions

use super::storage::StorageMode;

/// Configuration options for one layout session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Storage mode for the returned group; `None` uses the process-wide selection
    pub storage_mode: Option<StorageMode>,

    /// Refresh layout after the swap (full layout) or not (constraints only)
    pub perform_layout: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_mode: None,
            perform_layout: true,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Full layout: activate and refresh
    pub fn full() -> Self {
        Self::default()
    }

    /// Constraints only: activate without refreshing
    pub fn constraints_only() -> Self {
        Self::default().with_perform_layout(false)
    }

    /// Pin the storage mode instead of using the process-wide selection.
    /// Sessions fail with [`LayoutError::UnsupportedMode`] when the host
    /// cannot honour it.
    ///
    /// [`LayoutError::UnsupportedMode`]: super::LayoutError::UnsupportedMode
    pub fn with_storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = Some(mode);
        self
    }

    pub fn with_perform_layout(mut self, perform_layout: bool) -> Self {
        self.perform_layout = perform_layout;
        self
    }
}
