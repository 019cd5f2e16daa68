//! Observability: tracing bootstrap and in-process dispatch metrics.
//!
//! Metrics are plain atomics behind `DashMap`, rendered in Prometheus text
//! format by [`metrics::DispatchMetrics::render`].

pub mod logging;
pub mod metrics;
