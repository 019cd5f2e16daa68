//! Inbound side: envelope bytes in, handler invoked, optional envelope out.
//!
//! Each `consume` call walks the same stages and keeps nothing between calls:
//! transport decoded, context decoded, message decoded, handled, and
//! published when a publisher is attached. Any decode failure stops the walk
//! before the handler runs.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use orizuru_core::codec::AvroSchema;
use orizuru_core::protocol::decode_message;
use orizuru_core::{
    CodecError, ConsumerError, Context, Envelope, EnvelopePart, HandleMessageError, OrizuruError,
};

use crate::config::{ConfigError, OrizuruConfig};
use crate::handler::Handler;
use crate::publisher::Publisher;

/// Object-safe view of a consumer, as seen by the queue transport.
pub trait Consume: Send + Sync {
    fn queue_name(&self) -> &str;

    /// Process one message body. `Ok(None)` means the consumer is terminal.
    fn consume(&self, body: &[u8]) -> Result<Option<Bytes>, OrizuruError>;
}

/// Consumes `I` payloads, hands them to `H`, and forwards its `O` output to
/// the attached publisher, if any.
pub struct Consumer<I, O, H> {
    queue_name: String,
    handler: H,
    publisher: Option<Publisher<O>>,
    max_envelope_bytes: Option<usize>,
    _input: PhantomData<fn(I)>,
}

impl<I, O, H> Consumer<I, O, H>
where
    I: DeserializeOwned + AvroSchema,
    O: Serialize + AvroSchema,
    H: Handler<I, O>,
{
    /// A terminal consumer: handler output is dropped.
    pub fn new(queue_name: impl Into<String>, handler: H) -> Self {
        Self {
            queue_name: queue_name.into(),
            handler,
            publisher: None,
            max_envelope_bytes: None,
            _input: PhantomData,
        }
    }

    pub fn with_publisher(mut self, publisher: Publisher<O>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Reject bodies larger than `max` bytes without decoding them.
    pub fn with_max_envelope_bytes(mut self, max: usize) -> Self {
        self.max_envelope_bytes = Some(max);
        self
    }

    /// Build the consumer declared for `queue` in `config`.
    pub fn from_config(config: &OrizuruConfig, queue: &str, handler: H) -> Result<Self, ConfigError> {
        let binding = config
            .queue(queue)
            .ok_or_else(|| ConfigError::Invalid(format!("queue `{queue}` is not declared")))?;

        let mut consumer = Self::new(binding.name.clone(), handler)
            .with_max_envelope_bytes(config.max_envelope_bytes(binding));
        if let Some(target) = &binding.publish_to {
            consumer = consumer.with_publisher(Publisher::new(target.clone()));
        }
        Ok(consumer)
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn publisher(&self) -> Option<&Publisher<O>> {
        self.publisher.as_ref()
    }

    /// Decode, handle and optionally publish one message.
    pub fn consume(&self, body: &[u8]) -> Result<Option<Bytes>, OrizuruError> {
        let span = tracing::debug_span!("consume", queue = %self.queue_name, len = body.len());
        let _enter = span.enter();

        let (context, input) = self.decode(body).inspect_err(|e| {
            tracing::warn!(error = %e, part = ?e.decode_part(), "undecodable message");
        })?;

        let output = self
            .handler
            .handle(&context, input)
            .map_err(HandleMessageError::new)?;
        tracing::debug!("message handled");

        match &self.publisher {
            Some(publisher) => Ok(Some(publisher.publish(&context, &output)?)),
            None => Ok(None),
        }
    }

    fn decode(&self, body: &[u8]) -> Result<(Context, I), ConsumerError> {
        if let Some(max) = self.max_envelope_bytes {
            if body.len() > max {
                return Err(ConsumerError::decode(
                    EnvelopePart::Envelope,
                    CodecError::TooLarge {
                        len: body.len(),
                        max,
                    },
                ));
            }
        }

        let envelope = Envelope::decode(body)?;
        let context = Context::decode(&envelope)?;
        let input = decode_message::<I>(&envelope)?;
        tracing::trace!("envelope decoded");
        Ok((context, input))
    }
}

impl<I, O, H> Consume for Consumer<I, O, H>
where
    I: DeserializeOwned + AvroSchema,
    O: Serialize + AvroSchema,
    H: Handler<I, O>,
{
    fn queue_name(&self) -> &str {
        &self.queue_name
    }

    fn consume(&self, body: &[u8]) -> Result<Option<Bytes>, OrizuruError> {
        Consumer::consume(self, body)
    }
}

impl<I, O, H> fmt::Debug for Consumer<I, O, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("queue_name", &self.queue_name)
            .field("publisher", &self.publisher)
            .field("max_envelope_bytes", &self.max_envelope_bytes)
            .finish_non_exhaustive()
    }
}
