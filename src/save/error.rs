//! Error types for the extended save system
//!
//! Two layers:
//! - `CodecError`: failures of the JSON adapter (pure transformations)
//! - `SaveError`: everything the public API can report, with the type name,
//!   data name or file path attached as context

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while converting values to/from maps and JSON bytes
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The value did not convert to a JSON object
    #[error("expected a JSON object, found {0}")]
    NotAMap(&'static str),

    /// The value converted to an object with no fields
    #[error("value has no fields to persist")]
    EmptyMap,

    /// NaN or infinity; JSON would silently store these as `null`
    #[error("non-finite float {value} in field '{field}'")]
    NonFinite { field: String, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by hand-written `Persistable` impls
    #[error("{0}")]
    Custom(String),
}

impl CodecError {
    pub fn custom(msg: impl Into<String>) -> Self {
        CodecError::Custom(msg.into())
    }
}

/// Stage of the registration round trip that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    ToMap,
    Encode,
    Decode,
    FromMap,
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            ValidationStage::ToMap => "to-map",
            ValidationStage::Encode => "encode",
            ValidationStage::Decode => "decode",
            ValidationStage::FromMap => "from-map",
        };
        f.write_str(stage)
    }
}

/// Error types for extended save operations
#[derive(Debug, Error)]
pub enum SaveError {
    /// Data names must match `[A-Za-z0-9_-]{5,40}`
    #[error("invalid data name '{0}': expected 5-40 characters of [A-Za-z0-9_-]")]
    InvalidName(String),

    /// The type's default value cannot be represented as a non-empty map
    #[error("invalid data class '{type_name}': {source}")]
    InvalidDataClass {
        type_name: &'static str,
        #[source]
        source: CodecError,
    },

    /// The registration round trip failed past the first stage
    #[error("validation for type '{type_name}' failed at {stage} stage: {source}")]
    Validation {
        type_name: &'static str,
        stage: ValidationStage,
        #[source]
        source: CodecError,
    },

    #[error("failed to load '{type_name}' from {}: {source}", display_path(.path))]
    Load {
        type_name: &'static str,
        path: Option<PathBuf>,
        #[source]
        source: CodecError,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// One or more slots failed during a flush; the rest were still written
    #[error("{} of {attempted} data file(s) failed to save", .failures.len())]
    Flush {
        attempted: usize,
        failures: Vec<SlotFailure>,
    },

    #[error("data '{name}' is registered as '{registered}', not '{requested}'")]
    TypeMismatch {
        name: String,
        registered: &'static str,
        requested: &'static str,
    },

    #[error("data '{0}' is not registered")]
    UnknownData(String),

    #[error("invalid save identifier '{0}'")]
    InvalidSaveIdentifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single slot's failure inside a bulk flush
#[derive(Debug)]
pub struct SlotFailure {
    pub name: String,
    pub error: SaveError,
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "defaults".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;
