//! JSON rendering of [`Value`] trees at the output boundary.
//!
//! # Rendering rules
//!
//! 1. Byte strings become lowercase hex text.
//! 2. Tags become `{"_cbor_tag": <n>, "value": <inner>}`.
//! 3. Map keys become strings via [`key_label`]; later duplicate labels
//!    overwrite earlier ones, as any JSON object would.
//! 4. Integers outside the `i64`/`u64` range are rendered as decimal text.
//! 5. Non-finite floats become `null`.

use crate::value::model::Value;

/// Render a `Value` as a `serde_json::Value`.
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Integer(i) => integer_to_json(*i),
        Value::Bytes(b) => serde_json::Value::String(hex::encode(b)),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Null => serde_json::Value::Null,
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in entries {
                obj.insert(key_label(k), to_json(v));
            }
            serde_json::Value::Object(obj)
        }
        Value::Tag(tag, inner) => {
            let mut obj = serde_json::Map::new();
            obj.insert("_cbor_tag".into(), serde_json::Value::from(*tag));
            obj.insert("value".into(), to_json(inner));
            serde_json::Value::Object(obj)
        }
    }
}

/// String form of a map key.
///
/// Integers in decimal, text verbatim, bytes as hex, anything else as its
/// compact JSON rendering.
#[must_use]
pub fn key_label(key: &Value) -> String {
    match key {
        Value::Integer(i) => i.to_string(),
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => hex::encode(b),
        other => to_json(other).to_string(),
    }
}

fn integer_to_json(i: i128) -> serde_json::Value {
    if let Ok(small) = i64::try_from(i) {
        serde_json::Value::from(small)
    } else if let Ok(big) = u64::try_from(i) {
        serde_json::Value::from(big)
    } else {
        serde_json::Value::String(i.to_string())
    }
}
