//! Shared fixture builders for the lock tests.
//!
//! Fixtures are built as `Value` trees and serialized through `ciborium`,
//! so the bytes under test come from an independent encoder rather than
//! from anything in the workspace.

use std::io::Write;

use ciborium::value::Value as Raw;
use metadecode_kernel::value::model::Value;

#[must_use]
pub fn int(i: i128) -> Value {
    Value::Integer(i)
}

#[must_use]
pub fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

/// Mirror a `Value` into `ciborium`'s model.
///
/// # Panics
///
/// Panics on integers outside the CBOR range; fixtures never build those.
#[must_use]
pub fn to_raw(value: &Value) -> Raw {
    match value {
        Value::Integer(i) => Raw::Integer(
            ciborium::value::Integer::try_from(*i).expect("fixture integer fits CBOR"),
        ),
        Value::Bytes(b) => Raw::Bytes(b.clone()),
        Value::Text(s) => Raw::Text(s.clone()),
        Value::Bool(b) => Raw::Bool(*b),
        Value::Null => Raw::Null,
        Value::Float(f) => Raw::Float(*f),
        Value::Array(items) => Raw::Array(items.iter().map(to_raw).collect()),
        Value::Map(entries) => Raw::Map(
            entries
                .iter()
                .map(|(k, v)| (to_raw(k), to_raw(v)))
                .collect(),
        ),
        Value::Tag(tag, inner) => Raw::Tag(*tag, Box::new(to_raw(inner))),
    }
}

/// Structured-binary encoding of `value`.
///
/// # Panics
///
/// Panics if serialization into a `Vec` fails, which it cannot.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(&to_raw(value), &mut out).expect("serialize fixture");
    out
}

/// # Panics
///
/// Panics if the in-memory compressor fails.
#[must_use]
pub fn brotli_compress(data: &[u8]) -> Vec<u8> {
    let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, 5, 22);
    writer.write_all(data).expect("brotli write");
    writer.into_inner()
}

/// # Panics
///
/// Panics if the in-memory compressor fails.
#[must_use]
pub fn zstd_compress(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).expect("zstd encode")
}

/// Mainnet reward address: header `0xe1` and a 28-byte key hash.
#[must_use]
pub fn reward_address_bytes() -> Vec<u8> {
    let mut bytes = vec![0xe1];
    bytes.extend_from_slice(&[0x22; 28]);
    bytes
}

/// A well-formed voter registration with one weighted delegation.
#[must_use]
pub fn voter_registration_v2() -> Vec<(Value, Value)> {
    vec![
        (
            int(1),
            Value::Array(vec![Value::Array(vec![Value::Bytes(vec![0x11; 32]), int(1)])]),
        ),
        (int(2), Value::Bytes(vec![0x33; 32])),
        (int(3), Value::Text(hex::encode(reward_address_bytes()))),
        (int(4), int(42)),
        (int(5), int(2)),
    ]
}

/// `layers[0]` is a map; every later layer is the hex text of the
/// structured encoding of the layer before it.
#[must_use]
pub fn hex_onion(depth: usize) -> Vec<Value> {
    let mut layers = vec![Value::Map(vec![(int(1), text("core"))])];
    for i in 1..=depth {
        let inner = encode(&layers[i - 1]);
        layers.push(Value::Text(hex::encode(inner)));
    }
    layers
}
