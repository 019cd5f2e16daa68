//! Error taxonomy shared by consumers and publishers.
//!
//! Every failure is classified by the stage it happened in (decode, handle,
//! encode) so the queue transport can pick a retry policy: decode failures are
//! poison messages, handler failures may be transient, encode failures come
//! from the outbound side.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error used to carry arbitrary handler causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared result type.
pub type Result<T, E = OrizuruError> = std::result::Result<T, E>;

/// Stage a failure occurred in (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Envelope, context or message content could not be decoded.
    Decode,
    /// The business handler failed.
    Handle,
    /// Outgoing message or envelope could not be encoded.
    Encode,
}

impl Stage {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Decode => "DECODE",
            Stage::Handle => "HANDLE",
            Stage::Encode => "ENCODE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of an incoming envelope failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopePart {
    /// The outer transport record itself.
    Envelope,
    /// The embedded context schema or buffer.
    Context,
    /// The embedded message schema or buffer.
    Message,
}

impl EnvelopePart {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopePart::Envelope => "envelope",
            EnvelopePart::Context => "context",
            EnvelopePart::Message => "message",
        }
    }
}

impl fmt::Display for EnvelopePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level failure reported by the binary codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid schema")]
    InvalidSchema(#[source] apache_avro::Error),
    #[error("schema could not be rendered as text")]
    RenderSchema(#[source] serde_json::Error),
    #[error("buffer does not match schema")]
    Decode(#[source] apache_avro::Error),
    #[error("value does not match schema")]
    Encode(#[source] apache_avro::Error),
    #[error("decoded datum does not validate against its schema")]
    InvalidDatum,
    #[error("{remaining} trailing bytes after datum")]
    TrailingBytes { remaining: usize },
    #[error("schema mismatch: expected `{expected}`, found `{found}`")]
    SchemaMismatch { expected: String, found: String },
    #[error("unexpected shape: {0}")]
    UnexpectedShape(String),
    #[error("payload too large: {len} bytes (max {max})")]
    TooLarge { len: usize, max: usize },
}

/// Failure raised by, or wrapping a failure from, a business handler.
///
/// The cause is kept intact and exposed through [`StdError::source`].
#[derive(Debug)]
pub struct HandleMessageError {
    message: Option<String>,
    cause: BoxError,
}

impl HandleMessageError {
    /// Wrap a handler cause. An existing `HandleMessageError` is returned as is.
    pub fn new(cause: impl Into<BoxError>) -> Self {
        match cause.into().downcast::<HandleMessageError>() {
            Ok(inner) => *inner,
            Err(cause) => Self {
                message: None,
                cause,
            },
        }
    }

    /// Wrap a handler cause with an extra description.
    pub fn with_message(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: Some(message.into()),
            cause: cause.into(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The original handler failure.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    pub fn into_cause(self) -> BoxError {
        self.cause
    }
}

impl fmt::Display for HandleMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "failed to handle message: {msg}"),
            None => f.write_str("failed to handle message"),
        }
    }
}

impl StdError for HandleMessageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Consumer-side failures.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Incoming bytes could not be turned into a context and a typed input.
    /// The handler was not invoked.
    #[error("failed to decode transport ({part})")]
    DecodeTransport {
        part: EnvelopePart,
        #[source]
        source: CodecError,
    },
    #[error(transparent)]
    HandleMessage(#[from] HandleMessageError),
}

impl ConsumerError {
    pub fn decode(part: EnvelopePart, source: CodecError) -> Self {
        ConsumerError::DecodeTransport { part, source }
    }

    /// The envelope part that failed to decode, if this is a decode failure.
    pub fn decode_part(&self) -> Option<EnvelopePart> {
        match self {
            ConsumerError::DecodeTransport { part, .. } => Some(*part),
            ConsumerError::HandleMessage(_) => None,
        }
    }
}

/// Publisher-side failures.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("failed to encode context")]
    EncodeContext(#[source] CodecError),
    #[error("failed to encode message content")]
    EncodeMessageContent(#[source] CodecError),
    #[error("failed to encode transport")]
    EncodeTransport(#[source] CodecError),
}

/// Root error kind returned to the queue transport.
#[derive(Debug, Error)]
pub enum OrizuruError {
    #[error(transparent)]
    Consumer(#[from] ConsumerError),
    #[error(transparent)]
    Publisher(#[from] PublisherError),
}

impl OrizuruError {
    /// Stage the failure happened in.
    pub fn stage(&self) -> Stage {
        match self {
            OrizuruError::Consumer(ConsumerError::DecodeTransport { .. }) => Stage::Decode,
            OrizuruError::Consumer(ConsumerError::HandleMessage(_)) => Stage::Handle,
            OrizuruError::Publisher(_) => Stage::Encode,
        }
    }

    /// True when reprocessing the same bytes can never succeed.
    pub fn is_poison(&self) -> bool {
        self.stage() == Stage::Decode
    }

    pub fn handle_error(&self) -> Option<&HandleMessageError> {
        match self {
            OrizuruError::Consumer(ConsumerError::HandleMessage(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<HandleMessageError> for OrizuruError {
    fn from(e: HandleMessageError) -> Self {
        OrizuruError::Consumer(ConsumerError::HandleMessage(e))
    }
}
