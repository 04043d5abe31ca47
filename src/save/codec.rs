//! JSON adapter between registered values, key-value maps and file bytes
//!
//! Output is pretty-printed with 2-space indentation and a trailing newline
//! so extended save files diff cleanly.

use serde_json::{Map, Value};

use super::error::CodecError;
use super::finite::check_finite;
use super::saveable::Persistable;

/// Plain key-value representation of a registered value
pub type DataMap = Map<String, Value>;

/// File extension written by this adapter
pub const JSON_EXTENSION: &str = "json";

/// Encode a registered value to JSON bytes
pub fn encode<T: Persistable>(value: &T) -> Result<Vec<u8>, CodecError> {
    let map = to_checked_map(value)?;
    encode_map(&map)
}

/// `Persistable::to_map`, refusing values with NaN or infinite floats
pub fn to_checked_map<T: Persistable>(value: &T) -> Result<DataMap, CodecError> {
    check_finite(value)?;
    value.to_map()
}

/// Encode an already converted map
///
/// Fails with `EmptyMap` when there is nothing to persist.
pub fn encode_map(map: &DataMap) -> Result<Vec<u8>, CodecError> {
    if map.is_empty() {
        return Err(CodecError::EmptyMap);
    }

    let mut bytes = serde_json::to_vec_pretty(map)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode JSON bytes into a map
pub fn decode(bytes: &[u8]) -> Result<DataMap, CodecError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAMap(value_kind(&other))),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct ScoreData {
        score: i64,
    }

    impl Persistable for ScoreData {}

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Empty {}

    impl Persistable for Empty {}

    /// Tuple keys have no JSON representation
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct TupleKeyed {
        #[serde(skip_deserializing)]
        cells: HashMap<(i32, i32), u8>,
    }

    impl Persistable for TupleKeyed {}

    #[test]
    fn test_encode_pretty_two_space() {
        let bytes = encode(&ScoreData { score: 42 }).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"score\": 42\n}\n");
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Settings {
        difficulty: String,
        scaling: f32,
    }

    impl Persistable for Settings {}

    #[test]
    fn test_encode_nan_fails() {
        let settings = Settings { difficulty: "hard".to_string(), scaling: f32::NAN };
        assert!(matches!(encode(&settings), Err(CodecError::NonFinite { .. })));
    }

    #[test]
    fn test_encode_infinity_fails() {
        let settings = Settings { difficulty: "hard".to_string(), scaling: f32::INFINITY };
        assert!(matches!(encode(&settings), Err(CodecError::NonFinite { .. })));
    }

    #[test]
    fn test_encode_empty_fails() {
        assert!(matches!(encode(&Empty {}), Err(CodecError::EmptyMap)));
    }

    #[test]
    fn test_encode_unrepresentable_fails() {
        let mut value = TupleKeyed::default();
        value.cells.insert((1, 2), 3);
        assert!(matches!(encode(&value), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_decode_object() {
        let map = decode(br#"{"score": 7, "name": "x"}"#).unwrap();
        assert_eq!(map.get("score"), Some(&json!(7)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_decode_array_rejected() {
        assert!(matches!(decode(b"[1, 2]"), Err(CodecError::NotAMap("an array"))));
    }

    #[test]
    fn test_decode_garbage_rejected() {
        assert!(matches!(decode(b"{\"score\": "), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_round_trip_law() {
        let map = ScoreData::create_default().to_map().unwrap();
        let decoded = decode(&encode_map(&map).unwrap()).unwrap();
        assert_eq!(decoded, map);
    }
}
