//! Envelope protocol.
//!
//! An envelope nests two independently encoded blobs, a context and a typed
//! message, each with its own schema:
//! - `blob`: schema text + encoded bytes, decodable without any registry.
//! - `transport`: the fixed four-field outer record.
//! - `context`: metadata passed through from input to output unchanged.
//! - `message`: the typed business payload.
//!
//! Decoding is panic-free and all-or-nothing: malformed input surfaces as a
//! `ConsumerError`, never as a partially built value.

pub mod blob;
pub mod context;
pub mod message;
pub mod transport;

pub use blob::SchemaBlob;
pub use context::Context;
pub use message::{decode_message, encode_message, TypedMessage};
pub use transport::{transport_schema, Envelope, TRANSPORT_SCHEMA};
