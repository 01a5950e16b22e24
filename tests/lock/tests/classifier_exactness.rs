//! Envelope classification is decided by the key set and the shape of key 1.

use lock_tests::fixtures::int;
use metadecode_kernel::value::model::Value;
use metadecode_registration::envelope::{classify, EnvelopeKind};

fn keyed(keys: &[i128], key1: Value) -> Vec<(Value, Value)> {
    keys.iter()
        .map(|&k| {
            let v = if k == 1 { key1.clone() } else { int(0) };
            (int(k), v)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: CLASSIFY-X509
// ---------------------------------------------------------------------------

#[test]
fn rbac_key_set_is_x509_envelope() {
    assert_eq!(
        classify(&keyed(&[0, 10, 99], Value::Null)),
        EnvelopeKind::X509RbacEnvelope
    );
    assert_eq!(
        classify(&keyed(&[0, 11, 99], Value::Null)),
        EnvelopeKind::X509RbacEnvelope
    );
    // 99 alone, or a payload key without 0, is not enough
    assert_ne!(
        classify(&keyed(&[10, 99], Value::Null)),
        EnvelopeKind::X509RbacEnvelope
    );
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: CLASSIFY-REGISTRATION-VERSION
// ---------------------------------------------------------------------------

#[test]
fn delegation_array_is_v2() {
    let delegations = Value::Array(vec![Value::Array(vec![Value::Bytes(vec![7; 32]), int(3)])]);
    assert_eq!(
        classify(&keyed(&[1, 2, 3, 4, 5], delegations)),
        EnvelopeKind::VoterRegistrationV2
    );
}

#[test]
fn single_key_is_v1() {
    assert_eq!(
        classify(&keyed(&[1, 2, 3, 4, 5], Value::Bytes(vec![7; 32]))),
        EnvelopeKind::VoterRegistrationV1
    );
}

#[test]
fn decimal_text_keys_classify_like_integers() {
    let entries = vec![
        (Value::Text("0".into()), int(0)),
        (Value::Text("10".into()), int(0)),
        (Value::Text("99".into()), int(0)),
    ];
    assert_eq!(classify(&entries), EnvelopeKind::X509RbacEnvelope);
}
