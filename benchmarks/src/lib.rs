//! Shared input builders for metadecode benchmark suites.

use std::io::Write;

use ciborium::value::Value as Raw;

/// Structured-binary encoding of a `ciborium` value.
///
/// # Panics
///
/// Panics if serialization into a `Vec` fails. Benchmark setup failures are fatal.
#[must_use]
pub fn encode(value: &Raw) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).expect("serialize bench input");
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

/// A map wrapped `depth` times in hex text of its own encoding.
#[must_use]
pub fn hex_onion(depth: usize) -> Raw {
    let mut layer = Raw::Map(vec![(Raw::Integer(1.into()), Raw::Text("core".into()))]);
    for _ in 0..depth {
        layer = Raw::Text(hex::encode(encode(&layer)));
    }
    layer
}

/// A Catalyst-style document payload whose body holds `fields` entries.
#[must_use]
pub fn document_payload(fields: usize) -> Vec<u8> {
    let body = Raw::Map(
        (0..fields)
            .map(|i| {
                (
                    Raw::Text(format!("field_{i}")),
                    Raw::Text(hex::encode(encode(&Raw::Integer(
                        u64::try_from(i).unwrap_or(u64::MAX).into(),
                    )))),
                )
            })
            .collect(),
    );
    encode(&Raw::Array(vec![
        Raw::Integer(1.into()),
        Raw::Bytes(brotli_compress(&encode(&body))),
        Raw::Text("document".into()),
    ]))
}

/// Voter registration under label 61284 with `delegations` weighted keys.
#[must_use]
pub fn voter_registration(delegations: usize) -> Vec<u8> {
    let mut reward = vec![0xe1];
    reward.extend_from_slice(&[0x22; 28]);
    let keys = (0..delegations)
        .map(|i| {
            let mut key = vec![0x11; 32];
            key[0] = u8::try_from(i % 256).unwrap_or(0);
            Raw::Array(vec![Raw::Bytes(key), Raw::Integer(1.into())])
        })
        .collect();
    let registration = Raw::Map(vec![
        (Raw::Integer(1.into()), Raw::Array(keys)),
        (Raw::Integer(2.into()), Raw::Bytes(vec![0x33; 32])),
        (Raw::Integer(3.into()), Raw::Bytes(reward)),
        (Raw::Integer(4.into()), Raw::Integer(42.into())),
        (Raw::Integer(5.into()), Raw::Integer(0.into())),
    ]);
    encode(&Raw::Map(vec![(Raw::Integer(61284.into()), registration)]))
}
