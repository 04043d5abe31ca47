//! PersistentData: the handle feature modules hold for their registered data
//!
//! Cloning a handle is cheap and every clone sees the same value. The value
//! is `None` until the first save is activated, then replaced wholesale on
//! every activation.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::data_source::DataSource;
use super::error::Result;
use super::saveable::Persistable;

pub struct PersistentData<T: Persistable> {
    inner: Arc<SlotInner<T>>,
}

struct SlotInner<T: Persistable> {
    source: Box<dyn DataSource<T>>,
    value: RwLock<Option<T>>,
}

impl<T: Persistable> PersistentData<T> {
    pub(crate) fn new(source: Box<dyn DataSource<T>>) -> Self {
        PersistentData {
            inner: Arc::new(SlotInner {
                source,
                value: RwLock::new(None),
            }),
        }
    }

    /// Registration name
    pub fn name(&self) -> &str {
        self.inner.source.name().as_str()
    }

    pub fn filename(&self) -> String {
        self.inner.source.filename()
    }

    /// True once a save has been activated
    pub fn is_loaded(&self) -> bool {
        self.inner.value.read().is_some()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Option<T>> {
        self.inner.value.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Option<T>> {
        self.inner.value.write()
    }

    /// Copy of the current value
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.value.read().clone()
    }

    /// Replace the current value
    pub fn set(&self, value: T) {
        *self.inner.value.write() = Some(value);
    }

    /// Mutate the loaded value in place; `None` if nothing is loaded yet
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.inner.value.write().as_mut().map(f)
    }

    /// True if both handles refer to the same registration
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Persistable> Clone for PersistentData<T> {
    fn clone(&self) -> Self {
        PersistentData {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Persistable + fmt::Debug> fmt::Debug for PersistentData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentData")
            .field("name", &self.name())
            .field("value", &*self.read())
            .finish()
    }
}

/// Type-erased view of a slot used by the session registry
pub(crate) trait ErasedSlot: Send + Sync {
    fn name(&self) -> &str;

    fn filename(&self) -> String;

    fn type_name(&self) -> &'static str;

    /// Replace the value from `path`, or with defaults when `path` is `None`
    fn load(&self, path: Option<&Path>) -> Result<()>;

    /// Replace the value with defaults
    fn reset(&self);

    /// Write the value to `path`; `Ok(false)` if nothing is loaded
    fn save(&self, path: &Path) -> Result<bool>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Persistable> ErasedSlot for PersistentData<T> {
    fn name(&self) -> &str {
        PersistentData::name(self)
    }

    fn filename(&self) -> String {
        PersistentData::filename(self)
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn load(&self, path: Option<&Path>) -> Result<()> {
        let value = self.inner.source.create_or_default(path)?;
        self.set(value);
        Ok(())
    }

    fn reset(&self) {
        self.set(T::create_default());
    }

    fn save(&self, path: &Path) -> Result<bool> {
        let guard = self.inner.value.read();
        match guard.as_ref() {
            Some(value) => {
                self.inner.source.save_to_file(value, path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::data_source::JsonDataSource;
    use crate::save::types::DataName;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct ScoreData {
        score: i64,
    }

    impl Persistable for ScoreData {}

    fn slot() -> PersistentData<ScoreData> {
        let source = JsonDataSource::<ScoreData>::new(DataName::new("player_score").unwrap()).unwrap();
        PersistentData::new(Box::new(source))
    }

    #[test]
    fn test_starts_unloaded() {
        let slot = slot();
        assert!(!slot.is_loaded());
        assert_eq!(slot.get(), None);
        assert_eq!(slot.update(|v| v.score += 1), None);
    }

    #[test]
    fn test_clones_share_value() {
        let slot = slot();
        let other = slot.clone();

        slot.set(ScoreData { score: 3 });
        other.update(|v| v.score *= 2);

        assert!(slot.ptr_eq(&other));
        assert_eq!(slot.get(), Some(ScoreData { score: 6 }));
    }

    #[test]
    fn test_write_guard() {
        let slot = slot();
        *slot.write() = Some(ScoreData { score: 9 });
        assert_eq!(slot.read().as_ref().map(|v| v.score), Some(9));
    }

    #[test]
    fn test_erased_save_skips_unloaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("player_score.json");
        let slot = slot();

        assert!(!ErasedSlot::save(&slot, &path).unwrap());
        assert!(!path.exists());

        ErasedSlot::reset(&slot);
        assert!(ErasedSlot::save(&slot, &path).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_erased_downcast() {
        let slot = slot();
        let erased: Box<dyn ErasedSlot> = Box::new(slot.clone());

        let found = erased.as_any().downcast_ref::<PersistentData<ScoreData>>().unwrap();
        assert!(found.ptr_eq(&slot));
        assert!(erased.as_any().downcast_ref::<PersistentData<Other>>().is_none());
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Other {
        flag: bool,
    }

    impl Persistable for Other {}
}
