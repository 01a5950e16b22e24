//! Binary that decodes a fixed set of fixtures through the harness and
//! prints deterministic output lines for cross-process verification.
//!
//! Usage: `decode_fixture`
//! Output: one line per fixture, `<name>=<compact JSON report>`, followed
//! by `fixture_count=<n>`.

use lock_tests::fixtures::{
    brotli_compress, encode, hex_onion, int, text, voter_registration_v2,
};
use metadecode_harness::config::DecoderConfig;
use metadecode_harness::run::{run, Mode};
use metadecode_kernel::recovery::diagnostics::NullSink;
use metadecode_kernel::value::model::Value;

fn fixtures() -> Vec<(&'static str, Mode, Vec<u8>)> {
    let registration = encode(&Value::Map(vec![(
        int(61284),
        Value::Map(voter_registration_v2()),
    )]));

    let body = encode(&Value::Map(vec![
        (text("title"), text("Open tooling")),
        (text("budget"), int(25_000)),
    ]));
    let document = encode(&Value::Array(vec![
        int(1),
        Value::Bytes(brotli_compress(&body)),
        text("cafe"),
    ]));

    let onion = hex_onion(6);
    let onion_input = encode(&onion[6]);

    vec![
        ("registration_v2", Mode::Metadata, registration),
        ("document_direct", Mode::Document, document),
        ("hex_onion", Mode::Document, onion_input),
        ("undecodable", Mode::Document, vec![0xff; 40]),
    ]
}

fn main() {
    // Explicit config: the environment must not influence the output.
    let config = DecoderConfig::default().resolve(None);
    let fixtures = fixtures();
    for (name, mode, input) in &fixtures {
        let report = run(*mode, input, &config, &mut NullSink).expect("fixture decodes");
        println!("{name}={report}");
    }
    println!("fixture_count={}", fixtures.len());
}
