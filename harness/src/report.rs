//! JSON reports written by the CLI.
//!
//! A success report is the decode body with two extra top-level members:
//!
//! ```text
//! input_digest  "sha256:<hex>" of the raw input bytes, before hex decoding
//! decoder       { config: <resolved config>, diagnostics: [warn and error] }
//! ```
//!
//! An error report is `{"error": <message>}`, plus `input_digest` when the
//! input was read.

use metadecode_kernel::recovery::diagnostics::{CollectingSink, Diagnostic, DiagnosticLevel};
use sha2::{Digest, Sha256};

use crate::config::ResolvedConfig;

/// `sha256:<hex>` of `bytes`.
#[must_use]
pub fn input_digest(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

/// Wrap a decode body.
///
/// `body` is expected to be an object; any other JSON value is placed
/// under `result`.
#[must_use]
pub fn success_report(
    body: serde_json::Value,
    raw_input: &[u8],
    config: &ResolvedConfig,
    diagnostics: &CollectingSink,
) -> serde_json::Value {
    let mut obj = match body {
        serde_json::Value::Object(obj) => obj,
        other => {
            let mut obj = serde_json::Map::new();
            obj.insert("result".into(), other);
            obj
        }
    };
    obj.insert("input_digest".into(), input_digest(raw_input).into());
    obj.insert(
        "decoder".into(),
        serde_json::json!({
            "config": config.to_json(),
            "diagnostics": diagnostics
                .at_least(DiagnosticLevel::Warn)
                .map(Diagnostic::to_json)
                .collect::<Vec<_>>(),
        }),
    );
    serde_json::Value::Object(obj)
}

/// Top-level failure.
#[must_use]
pub fn error_report(message: &str, raw_input: Option<&[u8]>) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("error".into(), message.into());
    if let Some(raw) = raw_input {
        obj.insert("input_digest".into(), input_digest(raw).into());
    }
    serde_json::Value::Object(obj)
}
