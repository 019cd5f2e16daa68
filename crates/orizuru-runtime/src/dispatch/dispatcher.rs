use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;

use orizuru_core::{OrizuruError, Stage};

use crate::consumer::Consume;
use crate::obs::metrics::DispatchMetrics;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown queue: {0}")]
    UnknownQueue(String),
    #[error(transparent)]
    Consume(#[from] OrizuruError),
}

/// Routes message bodies to the consumer registered for their queue.
#[derive(Default)]
pub struct Dispatcher {
    consumers: DashMap<String, Arc<dyn Consume>>,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer under its queue name, replacing any previous one.
    pub fn register(&self, consumer: Arc<dyn Consume>) {
        let queue = consumer.queue_name().to_string();
        if self.consumers.insert(queue.clone(), consumer).is_some() {
            tracing::warn!(%queue, "consumer replaced");
        }
    }

    pub fn registered_queues(&self) -> Vec<String> {
        let mut queues: Vec<String> = self.consumers.iter().map(|e| e.key().clone()).collect();
        queues.sort();
        queues
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Hand `body` to the consumer of `queue`.
    ///
    /// Consumer failures are returned unchanged so the transport can decide
    /// between dead-lettering (decode) and redelivery (handle).
    pub fn dispatch(&self, queue: &str, body: &[u8]) -> Result<Option<Bytes>, DispatchError> {
        let consumer = match self.consumers.get(queue) {
            Some(entry) => entry.value().clone(),
            None => {
                // Unlabelled: callers can pass arbitrary queue names.
                self.metrics.unknown_queue.inc(&[]);
                return Err(DispatchError::UnknownQueue(queue.to_string()));
            }
        };

        let started = Instant::now();
        let res = consumer.consume(body);
        self.metrics
            .dispatch_duration
            .observe(&[("queue", queue)], started.elapsed());

        let outcome = match &res {
            Ok(Some(_)) => "published",
            Ok(None) => "ok",
            Err(e) => outcome_label(e.stage()),
        };
        self.metrics
            .messages
            .inc(&[("queue", queue), ("outcome", outcome)]);

        Ok(res?)
    }
}

fn outcome_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Decode => "decode",
        Stage::Handle => "handle",
        Stage::Encode => "encode",
    }
}
