//! Rejects NaN and infinite floats before a value reaches serde_json
//!
//! serde_json writes non-finite floats as `null`, which loads back as a type
//! error and resets the whole slot. Walking the value's own `Serialize` impl
//! catches them while the save can still fail loudly.

use serde::Serialize;
use serde::ser;

use super::error::CodecError;

/// Fails with `CodecError::NonFinite` if `value` contains a NaN or infinity
pub fn check_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), CodecError> {
    value.serialize(&mut FiniteCheck { field: "(root)" })
}

impl ser::Error for CodecError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CodecError::Custom(msg.to_string())
    }
}

struct FiniteCheck {
    /// Innermost struct field seen so far
    field: &'static str,
}

impl FiniteCheck {
    fn check(&self, value: f64) -> Result<(), CodecError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(CodecError::NonFinite {
                field: self.field.to_string(),
                value,
            })
        }
    }
}

impl<'a> ser::Serializer for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), CodecError> {
        self.check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), CodecError> {
        self.check(v)
    }

    fn serialize_char(self, _v: char) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), CodecError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, CodecError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CodecError> {
        Ok(self)
    }
}

impl<'a> ser::SerializeSeq for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CodecError> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        self.field = key;
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut FiniteCheck {
    type Ok = ();
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        self.field = key;
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CodecError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Settings {
        difficulty: String,
        scaling: f32,
    }

    #[derive(Serialize)]
    struct Nested {
        history: Vec<Option<f64>>,
        weights: BTreeMap<String, f64>,
    }

    #[derive(Serialize)]
    enum Shape {
        Circle { radius: f64 },
    }

    #[test]
    fn test_finite_values_pass() {
        let settings = Settings { difficulty: "hard".to_string(), scaling: 1.5 };
        check_finite(&settings).unwrap();
    }

    #[test]
    fn test_nan_reports_field() {
        let settings = Settings { difficulty: "hard".to_string(), scaling: f32::NAN };
        match check_finite(&settings) {
            Err(CodecError::NonFinite { field, value }) => {
                assert_eq!(field, "scaling");
                assert!(value.is_nan());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_infinity_inside_collections() {
        let nested = Nested {
            history: vec![Some(1.0), None, Some(f64::INFINITY)],
            weights: BTreeMap::new(),
        };
        assert!(matches!(check_finite(&nested), Err(CodecError::NonFinite { .. })));

        let mut weights = BTreeMap::new();
        weights.insert("speed".to_string(), f64::NEG_INFINITY);
        let nested = Nested { history: vec![], weights };
        assert!(matches!(check_finite(&nested), Err(CodecError::NonFinite { .. })));
    }

    #[test]
    fn test_struct_variant() {
        let shape = Shape::Circle { radius: f64::NAN };
        assert!(matches!(
            check_finite(&shape),
            Err(CodecError::NonFinite { field, .. }) if field == "radius"
        ));
    }
}
