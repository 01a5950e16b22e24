//! Stake-address extraction from certificate blobs.

use metadecode_kernel::value::model::Value;
use metadecode_registration::rbac::{parse_certificate, strip_last_char};

fn certificate(body: &[u8]) -> Value {
    let mut blob = vec![0x30, 0x82, 0x02, 0x10, 0xa0, 0x03];
    blob.extend_from_slice(body);
    blob.extend_from_slice(&[0x02, 0x01, 0xff]);
    Value::Bytes(blob)
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: CERT-URI-STRIP-LAST-CHAR
// ---------------------------------------------------------------------------

#[test]
fn captured_token_loses_exactly_one_character() {
    assert_eq!(strip_last_char("stake1abcXZ"), "stake1abcX");
    assert_eq!(strip_last_char("s"), "");
    assert_eq!(strip_last_char(""), "");
}

#[test]
fn stake_uri_in_certificate_is_extracted() {
    let info = parse_certificate(&certificate(b"\x86\x1eweb+cardano://addr/stake1abcxz")).unwrap();
    assert!(info.cardano_uri_found);
    assert!(info.has_asn1_structure);
    assert_eq!(info.stake_address.as_deref(), Some("stake1abcx"));
}

#[test]
fn mixed_case_stake_token_is_captured_whole() {
    let info = parse_certificate(&certificate(b"web+cardano://addr/stake1abcXZ")).unwrap();
    assert!(info.cardano_uri_found);
    assert_eq!(info.stake_address.as_deref(), Some("stake1abcX"));

    let bare = parse_certificate(&Value::Bytes(b"web+cardano://addr/stake1abcXZ".to_vec())).unwrap();
    assert_eq!(bare.stake_address.as_deref(), Some("stake1abcX"));
}

#[test]
fn certificate_without_uri_reports_not_found() {
    let info = parse_certificate(&certificate(b"no uri here")).unwrap();
    assert!(!info.cardano_uri_found);
    assert_eq!(info.stake_address, None);
    assert_eq!(info.length, 6 + 11 + 3);
}

#[test]
fn hex_text_certificate_is_accepted() {
    let Value::Bytes(raw) = certificate(b"web+cardano://addr/stake1uy9") else {
        unreachable!();
    };
    let info = parse_certificate(&Value::Text(hex::encode(raw))).unwrap();
    assert_eq!(info.stake_address.as_deref(), Some("stake1uy"));
}
