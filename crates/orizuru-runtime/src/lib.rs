//! Orizuru runtime: consumers, publishers and queue dispatch.
//!
//! This crate wires the envelope codec from `orizuru-core` to business
//! handlers. A queue transport hands raw bodies to a [`Consumer`] (directly or
//! through the [`dispatch::Dispatcher`]) and gets back either encoded output
//! bytes, nothing, or a classified error.

pub mod config;
pub mod consumer;
pub mod dispatch;
pub mod handler;
pub mod obs;
pub mod publisher;

pub use consumer::{Consume, Consumer};
pub use handler::Handler;
pub use publisher::Publisher;
