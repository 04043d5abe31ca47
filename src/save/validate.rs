//! Registration-time round trip check
//!
//! A type is run once through default → map → JSON → map → value before it
//! may enter the registry, so a type that can never be saved or loaded
//! fails at startup instead of on the player's first save.

use super::codec::{decode, encode_map, to_checked_map};
use super::error::{CodecError, SaveError, ValidationStage};
use super::saveable::Persistable;

pub fn validate<T: Persistable>() -> Result<(), SaveError> {
    let type_name = T::type_name();
    let fail = |stage: ValidationStage, source: CodecError| SaveError::Validation { type_name, stage, source };

    let map = to_checked_map(&T::create_default())
        .map_err(|source| SaveError::InvalidDataClass { type_name, source })?;

    let bytes = encode_map(&map).map_err(|source| match source {
        // Nothing to write means the type itself is unusable
        CodecError::EmptyMap => SaveError::InvalidDataClass { type_name, source },
        source => fail(ValidationStage::Encode, source),
    })?;

    let decoded = decode(&bytes).map_err(|source| fail(ValidationStage::Decode, source))?;

    T::from_map(decoded).map_err(|source| fail(ValidationStage::FromMap, source))?;

    log::debug!("Validated data type '{}'", type_name);
    Ok(())
}
