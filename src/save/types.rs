//! Names, directory naming and report types for the extended save system

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

use super::error::SaveError;

const NAME_MIN_LEN: usize = 5;
const NAME_MAX_LEN: usize = 40;

/// Validated registration name
///
/// 5 to 40 characters, each one of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataName(String);

impl DataName {
    pub fn new(name: &str) -> Result<Self, SaveError> {
        let valid_len = (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name.len());
        let valid_chars = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid_len || !valid_chars {
            return Err(SaveError::InvalidName(name.to_string()));
        }

        Ok(DataName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for this data with the given extension
    ///
    /// Lower-cased so the name is stable on case-insensitive filesystems.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0.to_lowercase(), extension)
    }
}

impl fmt::Display for DataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory name for a host save identifier
///
/// Everything from the first `.` onward is dropped, the rest is trimmed and
/// every character outside `[A-Za-z0-9_-]` becomes an underscore, so the
/// result is a valid directory name on every platform. Returns `None` when
/// nothing usable is left.
///
/// `"My Save.sav"` → `"My_Save"`
pub fn save_dir_name(identifier: &str) -> Option<String> {
    let stem = identifier.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        return None;
    }

    let name = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    Some(name)
}

/// Result of activating a save identifier
#[derive(Debug, PartialEq, Eq)]
pub enum Activation {
    /// The identifier was already active; nothing was read or reset
    AlreadyActive,
    Switched(LoadReport),
}

/// What happened to each slot while loading a save
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded from an existing data file
    pub loaded: Vec<String>,
    /// No data file existed; default-constructed
    pub defaulted: Vec<String>,
    /// Data file was unreadable; default-constructed instead
    pub recovered: Vec<String>,
}

/// What happened to each slot during a flush
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: Vec<String>,
    /// Never loaded, so nothing to write
    pub skipped: Vec<String>,
}

/// An extended save directory found on disk
#[derive(Debug, Clone)]
pub struct SaveDirInfo {
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Local>,
    /// Data file names, sorted
    pub files: Vec<String>,
}
