//! Persistable trait for data that can live in an extended save
//!
//! Feature modules implement this for every type they register. The default
//! methods route through serde, so for most types the implementation is a
//! single line:
//!
//! ```ignore
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct ScoreData {
//!     score: i64,
//! }
//!
//! impl Persistable for ScoreData {}
//! ```
//!
//! Override `to_map`/`from_map` when the on-disk shape should differ from the
//! serde shape (renamed legacy keys, computed fields and so on).

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::codec::{DataMap, value_kind};
use super::error::CodecError;

/// Capability required of every registered type
pub trait Persistable: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Fresh value used when a save has no data file for this type
    fn create_default() -> Self {
        Self::default()
    }

    /// Convert the value to the key-value map that gets written to disk
    fn to_map(&self) -> Result<DataMap, CodecError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(CodecError::NotAMap(value_kind(&other))),
        }
    }

    /// Rebuild a value from a decoded map
    fn from_map(map: DataMap) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Name used in diagnostics
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct ScoreData {
        score: i64,
    }

    impl Persistable for ScoreData {}

    /// Stores `kills` on disk under a legacy key
    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct KillCount {
        kills: u32,
    }

    impl Persistable for KillCount {
        fn to_map(&self) -> Result<DataMap, CodecError> {
            let mut map = DataMap::new();
            map.insert("kill_count".to_string(), json!(self.kills));
            Ok(map)
        }

        fn from_map(map: DataMap) -> Result<Self, CodecError> {
            let kills = map
                .get("kill_count")
                .and_then(Value::as_u64)
                .ok_or_else(|| CodecError::custom("missing 'kill_count'"))?;
            Ok(KillCount { kills: kills as u32 })
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Unit;

    impl Persistable for Unit {}

    #[test]
    fn test_default_to_map() {
        let map = ScoreData::create_default().to_map().unwrap();
        assert_eq!(Value::Object(map), json!({ "score": 0 }));
    }

    #[test]
    fn test_from_map() {
        let map = json!({ "score": 42 }).as_object().unwrap().clone();
        assert_eq!(ScoreData::from_map(map).unwrap(), ScoreData { score: 42 });
    }

    #[test]
    fn test_from_map_wrong_field_type() {
        let map = json!({ "score": "lots" }).as_object().unwrap().clone();
        assert!(matches!(ScoreData::from_map(map), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_overridden_mapping() {
        let map = KillCount { kills: 7 }.to_map().unwrap();
        assert_eq!(Value::Object(map.clone()), json!({ "kill_count": 7 }));
        assert_eq!(KillCount::from_map(map).unwrap(), KillCount { kills: 7 });
    }

    #[test]
    fn test_unit_struct_is_not_a_map() {
        assert!(matches!(Unit.to_map(), Err(CodecError::NotAMap("null"))));
    }

    #[test]
    fn test_type_name_mentions_type() {
        assert!(ScoreData::type_name().ends_with("ScoreData"));
    }
}
