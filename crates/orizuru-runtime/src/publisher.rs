//! Outbound side: turns a context and a typed output into envelope bytes.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::Serialize;

use orizuru_core::codec::AvroSchema;
use orizuru_core::protocol::{encode_message, Envelope};
use orizuru_core::{Context, PublisherError};

/// Encodes outgoing `O` payloads for one destination queue.
///
/// Stateless: `publish` may run concurrently from any number of threads.
pub struct Publisher<O> {
    queue_name: String,
    _output: PhantomData<fn(&O)>,
}

impl<O> Publisher<O> {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            _output: PhantomData,
        }
    }

    /// Destination queue the encoded bytes are meant for.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }
}

impl<O: Serialize + AvroSchema> Publisher<O> {
    /// Encode `message` and wrap it with `context` in a transport envelope.
    ///
    /// The context blob is copied through verbatim, never re-encoded. Either
    /// the full byte sequence is returned or nothing is.
    pub fn publish(&self, context: &Context, message: &O) -> Result<Bytes, PublisherError> {
        let message = encode_message(message)?;
        let envelope = Envelope::assemble(context.blob().clone(), message);
        let bytes = envelope.encode()?;

        tracing::debug!(queue = %self.queue_name, len = bytes.len(), "message published");
        Ok(bytes)
    }
}

impl<O> Clone for Publisher<O> {
    fn clone(&self) -> Self {
        Self::new(self.queue_name.clone())
    }
}

impl<O> fmt::Debug for Publisher<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("queue_name", &self.queue_name)
            .finish()
    }
}
