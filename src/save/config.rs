//! Session configuration

use std::path::{Path, PathBuf};

/// Directory under the platform data dir used when no base dir is given
const DEFAULT_DIR_NAME: &str = "save-extender";

/// Suffix the host uses for its own save files
pub const DEFAULT_SAVE_SUFFIX: &str = ".sav";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Root of the extended save tree; one subdirectory per host save
    pub base_dir: PathBuf,

    /// Host save identifiers must end with this to be accepted by the
    /// host event handlers
    pub save_suffix: String,

    /// Rename unreadable data files aside instead of leaving them to be
    /// overwritten by the next flush
    pub quarantine_corrupt: bool,
}

impl SessionConfig {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        SessionConfig {
            base_dir: base_dir.as_ref().to_path_buf(),
            save_suffix: DEFAULT_SAVE_SUFFIX.to_string(),
            quarantine_corrupt: true,
        }
    }

    pub fn with_save_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.save_suffix = suffix.into();
        self
    }

    pub fn with_quarantine(mut self, enabled: bool) -> Self {
        self.quarantine_corrupt = enabled;
        self
    }
}

impl Default for SessionConfig {
    /// `<data dir>/save-extender/_savedata`, or `./_savedata` if the platform
    /// has no data directory
    fn default() -> Self {
        let base_dir = dirs::data_dir()
            .map(|p| p.join(DEFAULT_DIR_NAME).join("_savedata"))
            .unwrap_or_else(|| PathBuf::from("./_savedata"));
        Self::new(base_dir)
    }
}
