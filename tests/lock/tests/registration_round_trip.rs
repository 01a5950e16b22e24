//! End-to-end normalization of known-good registration metadata.

use lock_tests::fixtures::{encode, int, text, voter_registration_v2};
use metadecode_harness::config::ResolvedConfig;
use metadecode_harness::metadata::decode_metadata;
use metadecode_kernel::recovery::diagnostics::{CollectingSink, DiagnosticLevel, NullSink};
use metadecode_kernel::value::model::Value;
use metadecode_registration::envelope::EnvelopeKind;
use metadecode_registration::normalize::MetadataNormalizer;

fn normalizer() -> MetadataNormalizer {
    MetadataNormalizer::default()
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: REGISTRATION-V2-ROUND-TRIP
// ---------------------------------------------------------------------------

#[test]
fn v2_sample_produces_complete_record() {
    let mut sink = CollectingSink::new();
    let record = normalizer().normalize_map(&voter_registration_v2(), &mut sink);

    assert_eq!(record.kind, EnvelopeKind::VoterRegistrationV2);
    assert_eq!(record.voter_delegations.as_ref().map(Vec::len), Some(1));
    assert!(record.stake_key.is_some());
    assert!(record.stake_hex.is_some());
    assert!(record.payment_address.is_some());
    assert_eq!(record.nonce, Some(int(42)));
    assert_eq!(record.voting_purpose, Some(int(2)));
    assert!(record.field_errors.is_empty());
    assert_eq!(sink.at_least(DiagnosticLevel::Warn).count(), 0);
}

#[test]
fn labelled_binary_metadata_matches_bare_map() {
    let bare = normalizer().normalize_map(&voter_registration_v2(), &mut NullSink);

    let full = encode(&Value::Map(vec![(int(61284), Value::Map(voter_registration_v2()))]));
    let labelled = decode_metadata(&full, &ResolvedConfig::default(), &mut NullSink).unwrap();

    assert_eq!(labelled.metadata_label, Some(61284));
    assert_eq!(labelled.stake_key, bare.stake_key);
    assert_eq!(labelled.payment_address, bare.payment_address);
    assert_eq!(labelled.voter_delegations, bare.voter_delegations);
}

#[test]
fn json_metadata_matches_binary_metadata() {
    let binary = encode(&Value::Map(vec![(int(61284), Value::Map(voter_registration_v2()))]));
    let json = format!(
        r#"{{"json_metadata": {{"61284": {{
            "1": [["0x{voting}", 1]],
            "2": "0x{stake}",
            "3": "0x{reward}",
            "4": 42,
            "5": 2
        }}}}}}"#,
        voting = hex::encode([0x11; 32]),
        stake = hex::encode([0x33; 32]),
        reward = hex::encode(lock_tests::fixtures::reward_address_bytes()),
    );

    let config = ResolvedConfig::default();
    let from_binary = decode_metadata(&binary, &config, &mut NullSink).unwrap();
    let from_json = decode_metadata(json.as_bytes(), &config, &mut NullSink).unwrap();
    assert_eq!(from_binary.to_json(), from_json.to_json());
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: UNKNOWN-KEY-PRESERVED
// ---------------------------------------------------------------------------

#[test]
fn undeclared_key_passes_through() {
    let mut entries = voter_registration_v2();
    entries.push((int(7), text("x")));
    let record = normalizer().normalize_map(&entries, &mut NullSink);

    assert_eq!(record.extras, vec![(int(7), text("x"))]);
    assert_eq!(record.to_json()["7"], "x");
}

#[test]
fn one_bad_field_does_not_blank_the_record() {
    let mut entries = voter_registration_v2();
    entries[2].1 = Value::Bytes(vec![0xe1, 0x00]);
    let mut sink = CollectingSink::new();
    let record = normalizer().normalize_map(&entries, &mut sink);

    assert_eq!(record.payment_address, None);
    assert_eq!(record.field_errors.len(), 1);
    assert_eq!(record.field_errors[0].field, "payment_address");
    assert!(sink.has_stage("normalize.payment_address"));
    assert!(record.stake_key.is_some());
    assert_eq!(record.nonce, Some(int(42)));
}
