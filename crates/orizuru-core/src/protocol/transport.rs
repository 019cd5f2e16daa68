//! Transport envelope: the only record that crosses the wire on its own.
//!
//! The envelope schema is fixed and versionless:
//!
//! ```json
//! {
//!   "namespace": "com.financialforce.orizuru",
//!   "name": "Transport",
//!   "type": "record",
//!   "fields": [
//!     { "name": "contextSchema", "type": "string" },
//!     { "name": "contextBuffer", "type": "bytes" },
//!     { "name": "messageSchema", "type": "string" },
//!     { "name": "messageBuffer", "type": "bytes" }
//!   ]
//! }
//! ```
//!
//! Only the nested context and message schemas vary per message type.

use bytes::Bytes;
use once_cell::sync::OnceCell;

use crate::codec::{self, Schema, Value};
use crate::error::{CodecError, ConsumerError, EnvelopePart, PublisherError};
use crate::protocol::blob::SchemaBlob;

/// Fixed schema of the outer envelope.
pub const TRANSPORT_SCHEMA: &str = r#"{
    "namespace": "com.financialforce.orizuru",
    "name": "Transport",
    "type": "record",
    "fields": [
        { "name": "contextSchema", "type": "string" },
        { "name": "contextBuffer", "type": "bytes" },
        { "name": "messageSchema", "type": "string" },
        { "name": "messageBuffer", "type": "bytes" }
    ]
}"#;

const CONTEXT_SCHEMA: &str = "contextSchema";
const CONTEXT_BUFFER: &str = "contextBuffer";
const MESSAGE_SCHEMA: &str = "messageSchema";
const MESSAGE_BUFFER: &str = "messageBuffer";

static SCHEMA: OnceCell<Schema> = OnceCell::new();

/// The parsed envelope schema, parsed once per process.
pub fn transport_schema() -> Result<&'static Schema, CodecError> {
    SCHEMA.get_or_try_init(|| codec::parse_schema(TRANSPORT_SCHEMA))
}

/// Decoded transport envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Schema text of the context.
    pub context_schema: String,
    /// Context bytes written against `context_schema`.
    pub context_buffer: Bytes,
    /// Schema text of the message.
    pub message_schema: String,
    /// Message bytes written against `message_schema`.
    pub message_buffer: Bytes,
}

impl Envelope {
    /// Flatten a context blob and a message blob into one envelope.
    pub fn assemble(context: SchemaBlob, message: SchemaBlob) -> Self {
        let (context_schema, context_buffer) = context.into_parts();
        let (message_schema, message_buffer) = message.into_parts();
        Self {
            context_schema,
            context_buffer,
            message_schema,
            message_buffer,
        }
    }

    pub fn context_blob(&self) -> SchemaBlob {
        SchemaBlob::new(self.context_schema.clone(), self.context_buffer.clone())
    }

    pub fn message_blob(&self) -> SchemaBlob {
        SchemaBlob::new(self.message_schema.clone(), self.message_buffer.clone())
    }

    /// Decode an envelope from raw bytes. All-or-nothing: truncated input,
    /// malformed fields and trailing bytes are all rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, ConsumerError> {
        Self::decode_record(bytes).map_err(|e| ConsumerError::decode(EnvelopePart::Envelope, e))
    }

    /// Encode the envelope. Exact inverse of [`Envelope::decode`].
    pub fn encode(&self) -> Result<Bytes, PublisherError> {
        self.encode_record().map_err(PublisherError::EncodeTransport)
    }

    fn decode_record(bytes: &[u8]) -> Result<Self, CodecError> {
        let schema = transport_schema()?;
        let fields = match codec::decode_datum(schema, bytes, None)? {
            Value::Record(fields) => fields,
            other => {
                return Err(CodecError::UnexpectedShape(format!(
                    "transport is not a record: {other:?}"
                )))
            }
        };

        let mut fields = fields.into_iter();
        let envelope = Self {
            context_schema: take_string(fields.next(), CONTEXT_SCHEMA)?,
            context_buffer: take_bytes(fields.next(), CONTEXT_BUFFER)?,
            message_schema: take_string(fields.next(), MESSAGE_SCHEMA)?,
            message_buffer: take_bytes(fields.next(), MESSAGE_BUFFER)?,
        };
        tracing::trace!(len = bytes.len(), "transport decoded");
        Ok(envelope)
    }

    fn encode_record(&self) -> Result<Bytes, CodecError> {
        let schema = transport_schema()?;
        let record = Value::Record(vec![
            (CONTEXT_SCHEMA.to_string(), Value::String(self.context_schema.clone())),
            (CONTEXT_BUFFER.to_string(), Value::Bytes(self.context_buffer.to_vec())),
            (MESSAGE_SCHEMA.to_string(), Value::String(self.message_schema.clone())),
            (MESSAGE_BUFFER.to_string(), Value::Bytes(self.message_buffer.to_vec())),
        ]);
        codec::encode_value(schema, record).map(Bytes::from)
    }
}

fn take_string(field: Option<(String, Value)>, name: &str) -> Result<String, CodecError> {
    match field {
        Some((n, Value::String(s))) if n == name => Ok(s),
        _ => Err(CodecError::UnexpectedShape(format!(
            "transport field `{name}` missing or not a string"
        ))),
    }
}

fn take_bytes(field: Option<(String, Value)>, name: &str) -> Result<Bytes, CodecError> {
    match field {
        Some((n, Value::Bytes(b))) if n == name => Ok(Bytes::from(b)),
        _ => Err(CodecError::UnexpectedShape(format!(
            "transport field `{name}` missing or not bytes"
        ))),
    }
}
