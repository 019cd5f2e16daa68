//! Binary codec seam.
//!
//! Every call into the schema-based binary engine (Apache Avro) goes through
//! this module, so the rest of the crate only sees schema text, byte buffers
//! and [`CodecError`].

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use apache_avro::types::Value;
pub use apache_avro::{AvroSchema, Schema};

use crate::error::CodecError;

/// Parse self-contained schema text.
pub fn parse_schema(text: &str) -> Result<Schema, CodecError> {
    Schema::parse_str(text).map_err(CodecError::InvalidSchema)
}

/// Render a schema as self-contained text, suitable for [`parse_schema`].
pub fn schema_text(schema: &Schema) -> Result<String, CodecError> {
    serde_json::to_string(schema).map_err(CodecError::RenderSchema)
}

/// Encode a serializable value against `schema`.
///
/// Fails when the value's shape does not validate against the schema.
pub fn encode_datum<T: Serialize + ?Sized>(schema: &Schema, value: &T) -> Result<Vec<u8>, CodecError> {
    let value = apache_avro::to_value(value).map_err(CodecError::Encode)?;
    encode_value(schema, value)
}

/// Encode an already built generic value against `schema`.
pub fn encode_value(schema: &Schema, value: Value) -> Result<Vec<u8>, CodecError> {
    apache_avro::to_avro_datum(schema, value).map_err(CodecError::Encode)
}

/// Decode exactly one datum written with `writer`, optionally resolved into
/// `reader`. The whole buffer must be consumed.
///
/// The engine can hand back a placeholder for a value cut short (a truncated
/// string decodes as null), so the raw datum is validated against `writer`
/// before any resolution.
pub fn decode_datum(writer: &Schema, bytes: &[u8], reader: Option<&Schema>) -> Result<Value, CodecError> {
    let mut rest = bytes;
    let value = apache_avro::from_avro_datum(writer, &mut rest, None).map_err(CodecError::Decode)?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: rest.len(),
        });
    }
    if !value.validate(writer) {
        return Err(CodecError::InvalidDatum);
    }
    match reader {
        Some(reader) => value.resolve(reader).map_err(CodecError::Decode),
        None => Ok(value),
    }
}

/// Materialize a decoded generic value as `T`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, CodecError> {
    apache_avro::from_value::<T>(value).map_err(CodecError::Decode)
}

/// Require two named schemas to describe the same type.
///
/// Only the unqualified names are compared; field-level compatibility is
/// left to schema resolution.
pub fn verify_named(expected: &Schema, found: &Schema) -> Result<(), CodecError> {
    match (expected.name(), found.name()) {
        (Some(e), Some(f)) if e.name != f.name => Err(CodecError::SchemaMismatch {
            expected: e.name.clone(),
            found: f.name.clone(),
        }),
        (Some(e), None) => Err(CodecError::SchemaMismatch {
            expected: e.name.clone(),
            found: unnamed(found),
        }),
        _ => Ok(()),
    }
}

fn unnamed(schema: &Schema) -> String {
    schema_text(schema).unwrap_or_else(|_| "<unnamed>".to_string())
}
