//! Data sources: per-type load/save of a single extended save file
//!
//! `JsonDataSource` is what `SaveSession::register` creates. Anything else
//! that implements `DataSource` can be handed to
//! `SaveSession::register_source` instead.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::codec::{self, JSON_EXTENSION};
use super::error::{CodecError, Result, SaveError};
use super::saveable::Persistable;
use super::types::DataName;
use super::validate::validate;

/// Loads and saves one registered type
pub trait DataSource<T: Persistable>: Send + Sync {
    fn name(&self) -> &DataName;

    /// File name inside a save directory; must be stable across runs
    fn filename(&self) -> String;

    /// Default value when `path` is `None`, otherwise the value stored there
    fn create_or_default(&self, path: Option<&Path>) -> Result<T>;

    /// Write `value` to `path`, creating parent directories as needed
    fn save_to_file(&self, value: &T, path: &Path) -> Result<()>;
}

/// JSON file per save, named `<lowercased name>.json`
pub struct JsonDataSource<T> {
    name: DataName,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Persistable> JsonDataSource<T> {
    /// Creates a source for `T`, validating the type first
    pub fn new(name: DataName) -> Result<Self> {
        validate::<T>()?;

        Ok(JsonDataSource {
            name,
            _marker: PhantomData,
        })
    }

    fn load(&self, path: &Path) -> std::result::Result<T, CodecError> {
        let bytes = fs::read(path)?;
        let map = codec::decode(&bytes)?;
        T::from_map(map)
    }
}

impl<T: Persistable> DataSource<T> for JsonDataSource<T> {
    fn name(&self) -> &DataName {
        &self.name
    }

    fn filename(&self) -> String {
        self.name.file_name(JSON_EXTENSION)
    }

    fn create_or_default(&self, path: Option<&Path>) -> Result<T> {
        let Some(path) = path else {
            return Ok(T::create_default());
        };

        self.load(path).map_err(|source| SaveError::Load {
            type_name: T::type_name(),
            path: Some(path.to_path_buf()),
            source,
        })
    }

    fn save_to_file(&self, value: &T, path: &Path) -> Result<()> {
        let serialize_err = |source: CodecError| SaveError::Serialize {
            path: path.to_path_buf(),
            source,
        };

        let bytes = codec::encode(value).map_err(serialize_err)?;
        write_atomic(path, &bytes).map_err(|e| serialize_err(CodecError::Io(e)))?;

        log::debug!("Saved '{}' to {}", self.name, path.display());
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over the target
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, bytes)?;

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
