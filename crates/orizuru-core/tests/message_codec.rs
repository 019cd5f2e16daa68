//! Context and typed message codec tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use apache_avro::AvroSchema;
use serde::{Deserialize, Serialize};

use orizuru_core::codec::{Schema, Value};
use orizuru_core::protocol::{decode_message, encode_message, Context, Envelope, SchemaBlob, TypedMessage};
use orizuru_core::{CodecError, PublisherError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
struct Amount {
    amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
struct Invoice {
    amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
struct Correlation {
    id: String,
}

mod text_amount {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, AvroSchema)]
    pub struct Amount {
        pub amount: String,
    }
}

mod priced_amount {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, AvroSchema)]
    pub struct Amount {
        pub amount: i64,
        pub currency: String,
    }
}

/// Declares a `long` field but serializes a string.
#[derive(Debug, Serialize)]
struct Mislabelled {
    amount: String,
}

impl AvroSchema for Mislabelled {
    fn get_schema() -> Schema {
        Schema::parse_str(
            r#"{"type":"record","name":"Mislabelled","fields":[{"name":"amount","type":"long"}]}"#,
        )
        .unwrap()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
struct Note {
    text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Customer {
    name: String,
    vip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Status {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: String,
    customer: Customer,
    note: Option<String>,
    lines: Vec<i64>,
    tags: HashMap<String, i64>,
    status: Status,
    #[serde(with = "serde_bytes")]
    signature: Vec<u8>,
}

impl AvroSchema for Order {
    fn get_schema() -> Schema {
        Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Order",
                "namespace": "billing",
                "fields": [
                    { "name": "id", "type": "string" },
                    { "name": "customer", "type": {
                        "type": "record",
                        "name": "Customer",
                        "fields": [
                            { "name": "name", "type": "string" },
                            { "name": "vip", "type": "boolean" }
                        ]
                    } },
                    { "name": "note", "type": ["null", "string"] },
                    { "name": "lines", "type": { "type": "array", "items": "long" } },
                    { "name": "tags", "type": { "type": "map", "values": "long" } },
                    { "name": "status", "type": {
                        "type": "enum",
                        "name": "Status",
                        "symbols": ["Open", "Closed"]
                    } },
                    { "name": "signature", "type": "bytes" }
                ]
            }"#,
        )
        .unwrap()
    }
}

const CORRELATION_SCHEMA: &str =
    r#"{"type":"record","name":"Correlation","fields":[{"name":"id","type":"string"}]}"#;

fn envelope_with(message: SchemaBlob) -> Envelope {
    let ctx = Context::encode(&Correlation { id: "42".into() }, CORRELATION_SCHEMA).unwrap();
    Envelope::assemble(ctx.blob().clone(), message)
}

#[test]
fn typed_message_round_trips_through_envelope() {
    let blob = encode_message(&Amount { amount: 10 }).unwrap();
    let env = envelope_with(blob);

    let bytes = env.encode().unwrap();
    let decoded = Envelope::decode(&bytes).unwrap();
    assert_eq!(decoded, env);

    let amount: Amount = decode_message(&decoded).unwrap();
    assert_eq!(amount, Amount { amount: 10 });
}

#[test]
fn nested_record_round_trips_through_envelope() {
    let order = Order {
        id: "ord-1".into(),
        customer: Customer {
            name: "Ada".into(),
            vip: true,
        },
        note: Some("leave at the door".into()),
        lines: vec![3, -1, 40_000_000_000],
        tags: HashMap::from([("rush".to_string(), 1), ("gift".to_string(), 0)]),
        status: Status::Closed,
        signature: vec![0x00, 0xff, 0x10],
    };
    let empty = Order {
        note: None,
        lines: Vec::new(),
        tags: HashMap::new(),
        status: Status::Open,
        signature: Vec::new(),
        ..order.clone()
    };

    for value in [order, empty] {
        let env = envelope_with(encode_message(&value).unwrap());
        let decoded = Envelope::decode(&env.encode().unwrap()).unwrap();
        assert_eq!(decode_message::<Order>(&decoded).unwrap(), value);
    }
}

#[test]
fn message_schema_travels_with_the_buffer() {
    let msg = TypedMessage::encode(&Amount { amount: 7 }).unwrap();
    let reparsed = msg.blob().parse_schema().unwrap();
    assert_eq!(reparsed, Amount::get_schema());
}

#[test]
fn differently_named_type_is_rejected() {
    let env = envelope_with(encode_message(&Invoice { amount: 10 }).unwrap());

    let err = decode_message::<Amount>(&env).unwrap_err();
    assert_eq!(err.decode_part().unwrap().as_str(), "message");
    match err {
        orizuru_core::ConsumerError::DecodeTransport {
            source: CodecError::SchemaMismatch { expected, found },
            ..
        } => {
            assert_eq!(expected, "Amount");
            assert_eq!(found, "Invoice");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn incompatible_field_type_is_rejected() {
    let env = envelope_with(encode_message(&Amount { amount: 10 }).unwrap());
    let err = decode_message::<text_amount::Amount>(&env).unwrap_err();
    assert_eq!(err.decode_part().unwrap().as_str(), "message");
}

#[test]
fn missing_reader_field_is_rejected() {
    let env = envelope_with(encode_message(&Amount { amount: 10 }).unwrap());
    assert!(decode_message::<priced_amount::Amount>(&env).is_err());
}

#[test]
fn extra_writer_field_is_skipped() {
    let priced = priced_amount::Amount {
        amount: 10,
        currency: "EUR".into(),
    };
    let env = envelope_with(encode_message(&priced).unwrap());
    let amount: Amount = decode_message(&env).unwrap();
    assert_eq!(amount.amount, 10);
}

#[test]
fn trailing_bytes_in_message_buffer_are_rejected() {
    let blob = encode_message(&Amount { amount: 10 }).unwrap();
    let mut buffer = blob.buffer().to_vec();
    buffer.push(0);
    let padded = SchemaBlob::new(blob.schema(), buffer);

    let err = TypedMessage::<Amount>::new(padded).decode().unwrap_err();
    assert!(matches!(err, CodecError::TrailingBytes { remaining: 1 }));
}

#[test]
fn value_disagreeing_with_its_schema_fails_to_encode() {
    let err = encode_message(&Mislabelled {
        amount: "ten".into(),
    })
    .unwrap_err();
    assert!(matches!(err, PublisherError::EncodeMessageContent(_)));
}

#[test]
fn context_exposes_fields_and_typed_view() {
    let ctx = Context::encode(&Correlation { id: "42".into() }, CORRELATION_SCHEMA).unwrap();

    assert_eq!(ctx.field("id"), Some(&Value::String("42".into())));
    assert_eq!(ctx.field("missing"), None);
    assert_eq!(
        ctx.decode_as::<Correlation>().unwrap(),
        Correlation { id: "42".into() }
    );
}

#[test]
fn context_from_record_matches_declared_schema() {
    let declared = Context::encode(&Correlation { id: "42".into() }, CORRELATION_SCHEMA).unwrap();
    let derived = Context::from_record(&Correlation { id: "42".into() }).unwrap();
    assert_eq!(declared.blob().buffer(), derived.blob().buffer());
}

#[test]
fn context_encode_failures_are_context_errors() {
    let bad_schema = Context::encode(&Correlation { id: "42".into() }, "{not a schema").unwrap_err();
    assert!(matches!(
        bad_schema,
        PublisherError::EncodeContext(CodecError::InvalidSchema(_))
    ));

    let wrong_shape = Context::encode(&Amount { amount: 1 }, CORRELATION_SCHEMA).unwrap_err();
    assert!(matches!(wrong_shape, PublisherError::EncodeContext(_)));
}

#[test]
fn context_decode_rejects_buffer_not_matching_schema() {
    let env = Envelope {
        context_schema: CORRELATION_SCHEMA.to_string(),
        // A string length of 5 with only two bytes behind it.
        context_buffer: vec![0x0a, b'4', b'2'].into(),
        message_schema: String::new(),
        message_buffer: Default::default(),
    };
    let err = Context::decode(&env).unwrap_err();
    assert_eq!(err.decode_part().unwrap().as_str(), "context");
}

#[test]
fn truncated_optional_string_is_rejected() {
    let blob = encode_message(&Note {
        text: Some("hello".into()),
    })
    .unwrap();
    // Branch index, declared length 5, then only one byte of text.
    assert_eq!(&blob.buffer()[..3], &[0x02, 0x0a, b'h']);
    let cut = SchemaBlob::new(blob.schema(), blob.buffer().slice(..3));

    let err = TypedMessage::<Note>::new(cut.clone()).decode().unwrap_err();
    assert!(matches!(err, CodecError::InvalidDatum), "{err:?}");

    let err = decode_message::<Note>(&envelope_with(cut)).unwrap_err();
    assert_eq!(err.decode_part().unwrap().as_str(), "message");
}

#[test]
fn truncated_context_string_is_rejected() {
    let ctx = Context::encode(&Correlation { id: "42".into() }, CORRELATION_SCHEMA).unwrap();
    assert_eq!(&ctx.blob().buffer()[..], &[0x04, b'4', b'2']);

    let env = Envelope {
        context_schema: CORRELATION_SCHEMA.to_string(),
        context_buffer: ctx.blob().buffer().slice(..2),
        message_schema: String::new(),
        message_buffer: Default::default(),
    };
    let err = Context::decode(&env).unwrap_err();
    assert_eq!(err.decode_part().unwrap().as_str(), "context");
    assert!(matches!(
        err,
        orizuru_core::ConsumerError::DecodeTransport {
            source: CodecError::InvalidDatum,
            ..
        }
    ));
}
