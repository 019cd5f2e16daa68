//! Top-level facade crate for Orizuru.
//!
//! Re-exports the envelope codec and the consumer/publisher runtime so users
//! can depend on a single crate.

pub mod core {
    pub use orizuru_core::*;
}

pub mod runtime {
    pub use orizuru_runtime::*;
}

pub use orizuru_core::{Context, Envelope, OrizuruError, SchemaBlob, Stage, TypedMessage};
pub use orizuru_runtime::{Consume, Consumer, Handler, Publisher};
