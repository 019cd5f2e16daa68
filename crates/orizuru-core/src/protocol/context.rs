//! Context: schema-described metadata carried next to every message.
//!
//! A context is decoded once per incoming message and passed through to the
//! outgoing envelope untouched: the original schema text and buffer are kept
//! and re-emitted verbatim.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{self, AvroSchema, Value};
use crate::error::{CodecError, ConsumerError, EnvelopePart, PublisherError};
use crate::protocol::blob::SchemaBlob;
use crate::protocol::transport::Envelope;

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    blob: SchemaBlob,
    value: Value,
}

impl Context {
    /// Decode the context carried by an envelope.
    pub fn decode(envelope: &Envelope) -> Result<Self, ConsumerError> {
        Self::from_blob(envelope.context_blob())
            .map_err(|e| ConsumerError::decode(EnvelopePart::Context, e))
    }

    /// Decode a context blob against its own schema.
    pub fn from_blob(blob: SchemaBlob) -> Result<Self, CodecError> {
        let value = blob.decode_value()?;
        Ok(Self { blob, value })
    }

    /// Build a context from a value and its declared schema text.
    ///
    /// Used by the first hop of a flow, which has no incoming context.
    pub fn encode<T: Serialize + ?Sized>(value: &T, schema: &str) -> Result<Self, PublisherError> {
        let schema = codec::parse_schema(schema).map_err(PublisherError::EncodeContext)?;
        SchemaBlob::encode(&schema, value)
            .and_then(Self::from_blob)
            .map_err(PublisherError::EncodeContext)
    }

    /// Like [`Context::encode`], with the schema derived from `T`.
    pub fn from_record<T: Serialize + AvroSchema>(value: &T) -> Result<Self, PublisherError> {
        SchemaBlob::encode(&T::get_schema(), value)
            .and_then(Self::from_blob)
            .map_err(PublisherError::EncodeContext)
    }

    /// Schema text and buffer exactly as received.
    pub fn blob(&self) -> &SchemaBlob {
        &self.blob
    }

    /// The decoded generic record.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Look up a top-level field of a record context.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.value {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Materialize the context as a concrete type.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        codec::from_value(&self.value)
    }
}
