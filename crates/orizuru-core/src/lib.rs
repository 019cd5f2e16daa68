//! Orizuru core: the self-describing envelope codec and the error taxonomy.
//!
//! This crate defines how a context and a typed payload are each encoded with
//! their own schema, nested into one transport envelope, and recovered on the
//! receiving side. It carries no queue or runtime dependencies so it can be
//! shared by consumers, publishers and tooling alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed bytes are reported as errors so a poison message cannot take a
//! worker down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod codec;
pub mod error;
pub mod protocol;

pub use error::{
    BoxError, CodecError, ConsumerError, EnvelopePart, HandleMessageError, OrizuruError,
    PublisherError, Result, Stage,
};
pub use protocol::{Context, Envelope, SchemaBlob, TypedMessage};
