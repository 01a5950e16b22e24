//! Metadata decode mode: read registration metadata in either of its
//! captured shapes and normalize it.
//!
//! Accepted inputs:
//!
//! - structured-binary bytes of the metadata map (or of a full
//!   transaction-metadata map, or of anything wrapping one);
//! - JSON `{"json_metadata": {...}}` as stored alongside a transaction;
//! - the bare JSON metadata object.
//!
//! JSON object keys written as decimal text (`"61284"`, `"1"`) become
//! integer keys at every level. A `null` or missing `json_metadata`
//! normalizes as an empty map.

use metadecode_kernel::recovery::diagnostics::DiagnosticSink;
use metadecode_kernel::value::cbor::{self, DecodeError};
use metadecode_kernel::value::model::Value;
use metadecode_registration::address::Cip19AddressCodec;
use metadecode_registration::envelope::EnvelopeError;
use metadecode_registration::fields::key_index;
use metadecode_registration::normalize::{MetadataNormalizer, NormalizedMetadata};

use crate::config::ResolvedConfig;

/// Key under which stored transactions keep their metadata.
pub const JSON_METADATA_KEY: &str = "json_metadata";

/// Why metadata input could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata JSON must be an object, found {found}")]
    NotAnObject { found: &'static str },
    #[error(transparent)]
    Undecodable(#[from] DecodeError),
    #[error(transparent)]
    NotAMap(#[from] EnvelopeError),
}

/// Parse metadata input into a `Value`, without normalizing it.
///
/// # Errors
///
/// [`MetadataError::NotAnObject`] for JSON that is not an object (after
/// unwrapping `json_metadata`), [`MetadataError::Undecodable`] when the
/// input is neither JSON nor structured binary.
pub fn read_metadata(bytes: &[u8]) -> Result<Value, MetadataError> {
    if let Some(json) = parse_json(bytes) {
        return from_json_metadata(&json);
    }
    Ok(cbor::decode(bytes)?)
}

/// Read and normalize metadata input.
///
/// # Errors
///
/// See [`read_metadata`]; [`MetadataError::NotAMap`] when no map can be
/// recovered from the decoded value.
pub fn decode_metadata(
    bytes: &[u8],
    config: &ResolvedConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<NormalizedMetadata, MetadataError> {
    let value = read_metadata(bytes)?;
    let normalizer = MetadataNormalizer::new(Cip19AddressCodec, config.normalizer_config());
    Ok(normalizer.normalize_metadata(value, sink)?)
}

/// JSON is only considered when the input looks like a JSON document; a
/// failed JSON parse falls back to structured binary.
fn parse_json(bytes: &[u8]) -> Option<serde_json::Value> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    if !(text.starts_with('{') || text.starts_with('[') || text == "null") {
        return None;
    }
    serde_json::from_str(text).ok()
}

fn from_json_metadata(json: &serde_json::Value) -> Result<Value, MetadataError> {
    let metadata = match json {
        serde_json::Value::Object(obj) if obj.contains_key(JSON_METADATA_KEY) => {
            &obj[JSON_METADATA_KEY]
        }
        other => other,
    };
    match metadata {
        serde_json::Value::Null => Ok(Value::Map(Vec::new())),
        obj @ serde_json::Value::Object(_) => Ok(integer_keys(Value::from_json(obj))),
        other => Err(MetadataError::NotAnObject {
            found: json_kind(other),
        }),
    }
}

/// Rewrite decimal-text map keys as integers, recursively.
fn integer_keys(value: Value) -> Value {
    match value {
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let key = key_index(&k).map_or(k, Value::Integer);
                    (key, integer_keys(v))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(integer_keys).collect()),
        other => other,
    }
}

const fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
