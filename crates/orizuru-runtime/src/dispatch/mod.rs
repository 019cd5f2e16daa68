//! Dispatcher module exports.
//!
//! Re-exports the dispatcher so downstream transports can depend on this
//! module directly.

pub mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher};
