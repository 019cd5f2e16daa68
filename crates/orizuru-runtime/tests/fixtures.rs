//! Payload types and helpers shared by runtime tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::convert::Infallible;

use apache_avro::{AvroSchema, Schema};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use orizuru_core::Context;
use orizuru_runtime::Publisher;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
pub struct Amount {
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
pub struct Invoice {
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
pub struct Correlation {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
pub struct Note {
    pub text: Option<String>,
}

/// Output whose declared schema disagrees with its serialized shape.
#[derive(Debug, Serialize)]
pub struct Mislabelled {
    pub amount: String,
}

impl AvroSchema for Mislabelled {
    fn get_schema() -> Schema {
        Schema::parse_str(
            r#"{"type":"record","name":"Mislabelled","fields":[{"name":"amount","type":"long"}]}"#,
        )
        .unwrap()
    }
}

pub fn context(id: &str) -> Context {
    Context::from_record(&Correlation { id: id.into() }).unwrap()
}

/// Envelope bytes as an upstream publisher would produce them.
pub fn incoming(id: &str, amount: i64) -> Bytes {
    Publisher::<Amount>::new("upstream")
        .publish(&context(id), &Amount { amount })
        .unwrap()
}

pub fn double(_ctx: &Context, input: Amount) -> Result<Amount, Infallible> {
    Ok(Amount {
        amount: input.amount * 2,
    })
}
