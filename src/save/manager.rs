//! Save session for extended save data
//!
//! This module provides the SaveSession struct which handles:
//! - Registering persistent data types under stable names
//! - Tracking which host save is active
//! - Loading every registered slot when the active save changes
//! - Flushing every loaded slot when the host saves
//! - Listing extended save directories on disk

use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::config::SessionConfig;
use super::data_source::{DataSource, JsonDataSource};
use super::error::{Result, SaveError, SlotFailure};
use super::saveable::Persistable;
use super::slot::{ErasedSlot, PersistentData};
use super::types::*;
use super::validate::validate;

pub struct SaveSession {
    config: SessionConfig,
    current_save: Option<String>,
    /// Keyed by lower-cased name: names that differ only in case share a
    /// data file, so they are one registration
    registry: BTreeMap<String, Box<dyn ErasedSlot>>,
}

fn registry_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl SaveSession {
    /// Creates a new SaveSession
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let base_dir = &config.base_dir;

        if !base_dir.exists() {
            fs::create_dir_all(base_dir)?;
        }
        if !base_dir.is_dir() {
            return Err(SaveError::Io(io::Error::other(format!(
                "extended save directory is not a directory: {}",
                base_dir.display()
            ))));
        }

        log::info!("Extended save directory: {}", base_dir.display());

        Ok(SaveSession {
            config,
            current_save: None,
            registry: BTreeMap::new(),
        })
    }

    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(SessionConfig::new(base_dir))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// Identifier of the active host save
    pub fn current_save(&self) -> Option<&str> {
        self.current_save.as_deref()
    }

    // ======================================================================
    // Registration
    // ======================================================================

    /// Register `T` under `name`, returning the existing slot if the name is
    /// already taken
    pub fn register<T: Persistable>(&mut self, name: &str) -> Result<PersistentData<T>> {
        self.register_with(name, false)
    }

    /// Register `T` under `name`
    ///
    /// With `overwrite` the previous registration is discarded along with
    /// its in-memory value.
    pub fn register_with<T: Persistable>(
        &mut self,
        name: &str,
        overwrite: bool,
    ) -> Result<PersistentData<T>> {
        let name = DataName::new(name)?;

        if !overwrite {
            if let Some(existing) = self.get::<T>(name.as_str())? {
                return Ok(existing);
            }
        }

        let source = JsonDataSource::<T>::new(name)?;
        Ok(self.insert(Box::new(source)))
    }

    /// Register `T` with a custom data source
    pub fn register_source<T, S>(&mut self, source: S, overwrite: bool) -> Result<PersistentData<T>>
    where
        T: Persistable,
        S: DataSource<T> + 'static,
    {
        if !overwrite {
            if let Some(existing) = self.get::<T>(source.name().as_str())? {
                return Ok(existing);
            }
        }

        validate::<T>()?;
        Ok(self.insert(Box::new(source)))
    }

    fn insert<T: Persistable>(&mut self, source: Box<dyn DataSource<T>>) -> PersistentData<T> {
        let slot = PersistentData::new(source);
        let name = slot.name().to_string();

        if self.registry.insert(registry_key(&name), Box::new(slot.clone())).is_some() {
            log::info!("Replaced registration for '{}'", name);
        } else {
            log::debug!("Registered '{}' as {}", name, T::type_name());
        }

        // Registered after a save was activated: load it now rather than
        // waiting for the next switch
        if let Some(current) = self.current_save.as_deref() {
            if let Some(dir) = self.save_dir(current) {
                let mut report = LoadReport::default();
                self.load_slot(&slot, &dir, &mut report);
            }
        }

        slot
    }

    /// Look up a registration
    ///
    /// Fails if `name` was registered with a different type.
    pub fn get<T: Persistable>(&self, name: &str) -> Result<Option<PersistentData<T>>> {
        let Some(slot) = self.registry.get(&registry_key(name)) else {
            return Ok(None);
        };

        match slot.as_any().downcast_ref::<PersistentData<T>>() {
            Some(found) => Ok(Some(found.clone())),
            None => Err(SaveError::TypeMismatch {
                name: name.to_string(),
                registered: slot.type_name(),
                requested: T::type_name(),
            }),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(&registry_key(name))
    }

    /// Registered names as first given, sorted case-insensitively
    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.registry.values().map(|slot| slot.name())
    }

    // ======================================================================
    // Loading
    // ======================================================================

    /// Make `identifier` the active save and load every registered slot
    ///
    /// Re-activating the active save does nothing. Switching saves flushes
    /// the previous one first. Unreadable data files fall back to defaults
    /// for that slot only.
    pub fn activate(&mut self, identifier: &str) -> Result<Activation> {
        let dir = self
            .save_dir(identifier)
            .ok_or_else(|| SaveError::InvalidSaveIdentifier(identifier.to_string()))?;

        if self.current_save.as_deref() == Some(identifier) {
            log::debug!("Save '{}' is already active", identifier);
            return Ok(Activation::AlreadyActive);
        }

        if let Some(previous) = self.current_save.as_deref() {
            if let Err(err) = self.save(None) {
                // The switch still happens; the host has already moved on
                log::error!("Failed to flush '{}' before switching: {}", previous, err);
            }
        }

        self.current_save = Some(identifier.to_string());

        let mut report = LoadReport::default();
        for slot in self.registry.values() {
            self.load_slot(slot.as_ref(), &dir, &mut report);
        }

        log::info!(
            "Activated save '{}': {} loaded, {} defaulted, {} recovered",
            identifier,
            report.loaded.len(),
            report.defaulted.len(),
            report.recovered.len()
        );

        Ok(Activation::Switched(report))
    }

    fn load_slot(&self, slot: &dyn ErasedSlot, dir: &Path, report: &mut LoadReport) {
        let path = dir.join(slot.filename());
        let exists = path.is_file();

        match slot.load(exists.then_some(path.as_path())) {
            Ok(()) if exists => report.loaded.push(slot.name().to_string()),
            Ok(()) => report.defaulted.push(slot.name().to_string()),
            Err(err) => {
                log::warn!("[{}] {}; using defaults", slot.name(), err);
                if exists && self.config.quarantine_corrupt {
                    quarantine(&path);
                }
                slot.reset();
                report.recovered.push(slot.name().to_string());
            }
        }
    }

    // ======================================================================
    // Saving
    // ======================================================================

    /// Flush one named slot, or every slot when `name` is `None`
    ///
    /// With no active save this only logs a warning. During a bulk flush a
    /// failing slot does not stop the others; failures are returned together
    /// as `SaveError::Flush`.
    pub fn save(&self, name: Option<&str>) -> Result<FlushReport> {
        let Some(current) = self.current_save.as_deref() else {
            log::warn!("Can't save: no save file is active");
            return Ok(FlushReport::default());
        };

        let dir = self
            .save_dir(current)
            .ok_or_else(|| SaveError::InvalidSaveIdentifier(current.to_string()))?;
        let mut report = FlushReport::default();

        if let Some(name) = name {
            let slot = self
                .registry
                .get(&registry_key(name))
                .ok_or_else(|| SaveError::UnknownData(name.to_string()))?;
            save_slot(slot.as_ref(), &dir, &mut report)?;
            return Ok(report);
        }

        let mut failures = Vec::new();
        for slot in self.registry.values() {
            if let Err(error) = save_slot(slot.as_ref(), &dir, &mut report) {
                log::error!("[{}] {}", slot.name(), error);
                failures.push(SlotFailure {
                    name: slot.name().to_string(),
                    error,
                });
            }
        }

        if !failures.is_empty() {
            return Err(SaveError::Flush {
                attempted: report.written.len() + failures.len(),
                failures,
            });
        }

        log::info!(
            "Saved '{}': {} written, {} skipped",
            current,
            report.written.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Flush every loaded slot for the active save
    pub fn flush(&self) -> Result<FlushReport> {
        self.save(None)
    }

    // ======================================================================
    // Directories
    // ======================================================================

    /// Directory holding the data files for a host save identifier
    pub fn save_dir(&self, identifier: &str) -> Option<PathBuf> {
        save_dir_name(identifier).map(|name| self.config.base_dir.join(name))
    }

    /// List extended save directories, newest first
    pub fn list_saves(&self) -> Result<Vec<SaveDirInfo>> {
        let mut saves = Vec::new();

        for entry in fs::read_dir(&self.config.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };

            let listing = match fs::read_dir(&path) {
                Ok(listing) => listing,
                Err(err) => {
                    log::warn!("Skipping unreadable save directory {}: {}", path.display(), err);
                    continue;
                }
            };

            let mut files: Vec<String> = listing
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
                .filter_map(|p| p.file_name().and_then(|f| f.to_str()).map(str::to_string))
                .collect();
            files.sort();

            saves.push(SaveDirInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                modified: DateTime::<Local>::from(modified),
                files,
            });
        }

        saves.sort_by(|a, b| b.modified.cmp(&a.modified));

        Ok(saves)
    }
}

fn save_slot(slot: &dyn ErasedSlot, dir: &Path, report: &mut FlushReport) -> Result<()> {
    let path = dir.join(slot.filename());
    if slot.save(&path)? {
        report.written.push(slot.name().to_string());
    } else {
        report.skipped.push(slot.name().to_string());
    }
    Ok(())
}

/// Move an unreadable data file aside so the next flush can't clobber it
fn quarantine(path: &Path) {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{}", timestamp));
    let target = path.with_file_name(name);

    match fs::rename(path, &target) {
        Ok(()) => log::warn!("Moved unreadable data file to {}", target.display()),
        Err(err) => log::warn!("Failed to move aside {}: {}", path.display(), err),
    }
}
