//! Field-level helpers shared by the classifier, normalizer and RBAC parser.
//!
//! Registration metadata reaches us in several shapes depending on where it
//! was captured: raw structured maps with integer keys and byte strings, or
//! JSON with decimal-string keys and `0x`-prefixed hex text. These helpers
//! read both shapes the same way.

use metadecode_kernel::value::hex_text::decode_prefixed;
use metadecode_kernel::value::model::Value;
use metadecode_kernel::value::render::to_json;

/// Numeric index of a map key: an integer, or decimal text such as `"10"`.
#[must_use]
pub fn key_index(key: &Value) -> Option<i128> {
    match key {
        Value::Integer(i) => Some(*i),
        Value::Text(s) => {
            let digits = s.strip_prefix('-').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

/// First value whose key has numeric index `index`.
#[must_use]
pub fn lookup(entries: &[(Value, Value)], index: i128) -> Option<&Value> {
    entries
        .iter()
        .find(|(k, _)| key_index(k) == Some(index))
        .map(|(_, v)| v)
}

/// Raw bytes carried by a field.
///
/// Accepts byte strings, hex text (with or without `0x`), arrays of
/// integers in `0..=255`, and any of those under semantic tags.
///
/// # Errors
///
/// Returns a human-readable reason when the value has none of those shapes.
pub fn key_bytes(value: &Value) -> Result<Vec<u8>, String> {
    match value.untagged() {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) => decode_prefixed(s).map_err(|e| format!("invalid hex text: {e}")),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_integer()
                    .and_then(|i| u8::try_from(i).ok())
                    .ok_or_else(|| format!("byte array holds a non-byte {}", item.kind()))
            })
            .collect(),
        other => Err(format!("expected bytes, found {}", other.kind())),
    }
}

/// Hex text form of a field.
///
/// Bytes and byte arrays are hex-encoded, text loses one `0x` prefix and is
/// otherwise kept verbatim, anything else falls back to its compact JSON.
#[must_use]
pub fn hex_text(value: &Value) -> String {
    match value.untagged() {
        Value::Text(s) => s.strip_prefix("0x").unwrap_or(s).to_owned(),
        other => match key_bytes(other) {
            Ok(bytes) => hex::encode(bytes),
            Err(_) => to_json(other).to_string(),
        },
    }
}
