//! Typed business payloads.
//!
//! The payload schema is derived from `T` when encoding and travels verbatim
//! inside the envelope. Decoding checks the embedded schema against the one
//! `T` expects before materializing anything; there is no registry enforcing
//! producer/consumer agreement, so this is the integrity gate.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{self, AvroSchema, Schema};
use crate::error::{CodecError, ConsumerError, EnvelopePart, PublisherError};
use crate::protocol::blob::SchemaBlob;
use crate::protocol::transport::Envelope;

/// A [`SchemaBlob`] known to carry a `T`.
pub struct TypedMessage<T> {
    blob: SchemaBlob,
    _payload: PhantomData<fn() -> T>,
}

impl<T> TypedMessage<T> {
    pub fn new(blob: SchemaBlob) -> Self {
        Self {
            blob,
            _payload: PhantomData,
        }
    }

    /// The message half of an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self::new(envelope.message_blob())
    }

    pub fn blob(&self) -> &SchemaBlob {
        &self.blob
    }

    pub fn into_blob(self) -> SchemaBlob {
        self.blob
    }
}

impl<T: Serialize> TypedMessage<T> {
    /// Encode against an explicit schema.
    pub fn encode_with(schema: &Schema, message: &T) -> Result<Self, CodecError> {
        SchemaBlob::encode(schema, message).map(Self::new)
    }
}

impl<T: Serialize + AvroSchema> TypedMessage<T> {
    /// Encode with the schema declared by `T`.
    ///
    /// A value whose serialized shape disagrees with `T`'s schema is rejected.
    pub fn encode(message: &T) -> Result<Self, CodecError> {
        Self::encode_with(&T::get_schema(), message)
    }
}

impl<T: DeserializeOwned + AvroSchema> TypedMessage<T> {
    /// Decode the payload as `T`.
    ///
    /// The embedded schema must name the same type `T` declares, and must
    /// resolve against `T`'s schema field by field.
    pub fn decode(&self) -> Result<T, CodecError> {
        let writer = self.blob.parse_schema()?;
        let reader = T::get_schema();
        codec::verify_named(&reader, &writer)?;
        let value = codec::decode_datum(&writer, self.blob.buffer(), Some(&reader))?;
        codec::from_value(&value)
    }
}

impl<T> Clone for TypedMessage<T> {
    fn clone(&self) -> Self {
        Self::new(self.blob.clone())
    }
}

impl<T> fmt::Debug for TypedMessage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedMessage")
            .field("type", &std::any::type_name::<T>())
            .field("blob", &self.blob)
            .finish()
    }
}

/// Decode the typed message carried by an envelope.
pub fn decode_message<T: DeserializeOwned + AvroSchema>(envelope: &Envelope) -> Result<T, ConsumerError> {
    TypedMessage::<T>::from_envelope(envelope)
        .decode()
        .map_err(|e| ConsumerError::decode(EnvelopePart::Message, e))
}

/// Encode an outgoing payload into a blob ready for an envelope.
pub fn encode_message<T: Serialize + AvroSchema>(message: &T) -> Result<SchemaBlob, PublisherError> {
    TypedMessage::encode(message)
        .map(TypedMessage::into_blob)
        .map_err(PublisherError::EncodeMessageContent)
}
