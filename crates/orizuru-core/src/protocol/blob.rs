//! Schema text paired with the bytes written against it.

use bytes::Bytes;
use serde::Serialize;

use crate::codec::{self, Schema, Value};
use crate::error::CodecError;

/// A `(schema, buffer)` pair that decodes on its own, without any registry.
///
/// Immutable once built; clones share the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBlob {
    schema: String,
    buffer: Bytes,
}

impl SchemaBlob {
    /// Pair schema text with a buffer produced against it. No validation is
    /// done here; decoding is where mismatches surface.
    pub fn new(schema: impl Into<String>, buffer: impl Into<Bytes>) -> Self {
        Self {
            schema: schema.into(),
            buffer: buffer.into(),
        }
    }

    /// Encode `value` against `schema`, recording the schema text verbatim.
    pub fn encode<T: Serialize + ?Sized>(schema: &Schema, value: &T) -> Result<Self, CodecError> {
        let buffer = codec::encode_datum(schema, value)?;
        Ok(Self {
            schema: codec::schema_text(schema)?,
            buffer: Bytes::from(buffer),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    pub fn into_parts(self) -> (String, Bytes) {
        (self.schema, self.buffer)
    }

    /// Parse the embedded schema text.
    pub fn parse_schema(&self) -> Result<Schema, CodecError> {
        codec::parse_schema(&self.schema)
    }

    /// Decode the buffer against its own schema into a generic value.
    pub fn decode_value(&self) -> Result<Value, CodecError> {
        let schema = self.parse_schema()?;
        codec::decode_datum(&schema, &self.buffer, None)
    }
}
