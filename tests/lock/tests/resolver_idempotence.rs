//! Recovery output is a fixed point: resolving it again changes nothing.

use lock_tests::fixtures::{brotli_compress, encode, hex_onion, int, text, zstd_compress};
use metadecode_kernel::recovery::budget::RecoveryLimits;
use metadecode_kernel::recovery::diagnostics::NullSink;
use metadecode_kernel::recovery::resolver::resolve;
use metadecode_kernel::value::model::Value;

fn resolve_default(value: Value) -> Value {
    resolve(value, &RecoveryLimits::default(), &mut NullSink)
}

fn assert_fixed_point(input: Value) {
    let once = resolve_default(input);
    let twice = resolve_default(once.clone());
    assert_eq!(once, twice, "second pass changed the output");
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: RESOLVE-IDEMPOTENT
// ---------------------------------------------------------------------------

#[test]
fn hex_onion_is_fixed_point() {
    let layers = hex_onion(5);
    assert_fixed_point(layers[5].clone());
    assert_eq!(resolve_default(layers[5].clone()), layers[0]);
}

#[test]
fn compressed_leaves_are_fixed_point() {
    let inner = encode(&Value::Map(vec![(text("k"), text("value"))]));
    let input = Value::Array(vec![
        Value::Bytes(brotli_compress(&inner)),
        Value::Bytes(zstd_compress(br#"{"a": [1, 2]}"#)),
        Value::Bytes(brotli_compress(b"plain words")),
        text("not hex at all"),
        int(-5),
    ]);
    assert_fixed_point(input);
}

#[test]
fn undecodable_bytes_stay_hex_across_passes() {
    let input = Value::Bytes(vec![0x1c, 0x1c, 0x1c]);
    let once = resolve_default(input);
    assert_eq!(once, text("1c1c1c"));
    assert_eq!(resolve_default(once.clone()), once);
}

#[test]
fn maps_with_hex_keys_are_fixed_point() {
    let input = Value::Map(vec![
        (text(&hex::encode(encode(&int(7)))), text("x")),
        (int(2), Value::Tag(24, Box::new(Value::Bytes(encode(&text("y")))))),
    ]);
    let once = resolve_default(input);
    assert_eq!(
        once,
        Value::Map(vec![
            (int(7), text("x")),
            (int(2), Value::Tag(24, Box::new(text("y")))),
        ])
    );
    assert_fixed_point(once);
}
