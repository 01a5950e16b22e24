//! Structured-binary (CBOR) decoding into [`Value`] trees.
//!
//! Decoding is one-directional: nothing in the crate re-serializes a tree.
//! The wire parse itself is delegated to `ciborium`; this module owns the
//! mapping from `ciborium`'s value model onto ours and the error surface.
//!
//! # Contract
//!
//! - Deterministic and side-effect free.
//! - Any structural violation (truncated header or length prefix, reserved
//!   additional-info values, invalid UTF-8 in a text string, unbalanced
//!   break) is a [`DecodeError::MalformedData`].
//! - Exactly one top-level item is read. Trailing bytes after it are
//!   ignored, not rejected.

use crate::value::model::Value;

/// Typed failure for a structured-binary parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input is not a well-formed structured-binary item.
    #[error("malformed structured data: {detail}")]
    MalformedData { detail: String },
}

/// Decode the first structured-binary item in `bytes`.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedData`] if `bytes` is empty or the first
/// item is structurally invalid.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_prefix(bytes).map(|(value, _)| value)
}

/// Decode the first item and report how many input bytes it occupied.
///
/// `consumed < bytes.len()` means trailing bytes followed the item.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::MalformedData {
            detail: "empty input".into(),
        });
    }
    let mut rest = bytes;
    let raw: ciborium::value::Value =
        ciborium::de::from_reader(&mut rest).map_err(|e| DecodeError::MalformedData {
            detail: e.to_string(),
        })?;
    let consumed = bytes.len() - rest.len();
    Ok((convert(raw)?, consumed))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn convert(raw: ciborium::value::Value) -> Result<Value, DecodeError> {
    use ciborium::value::Value as Raw;

    Ok(match raw {
        Raw::Integer(i) => Value::Integer(i128::from(i)),
        Raw::Bytes(b) => Value::Bytes(b),
        Raw::Float(f) => Value::Float(f),
        Raw::Text(s) => Value::Text(s),
        Raw::Bool(b) => Value::Bool(b),
        Raw::Null => Value::Null,
        Raw::Tag(tag, inner) => Value::Tag(tag, Box::new(convert(*inner)?)),
        Raw::Array(items) => Value::Array(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Raw::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| Ok((convert(k)?, convert(v)?)))
                .collect::<Result<Vec<_>, DecodeError>>()?,
        ),
        other => {
            return Err(DecodeError::MalformedData {
                detail: format!("unsupported item: {other:?}"),
            })
        }
    })
}
