//! `Value`: the decoded form of every structured-binary item.
//!
//! A `Value` is produced by [`crate::value::cbor::decode`] and rewritten by
//! the recovery engine. Trees are value-owned and built bottom-up; nothing
//! in a tree is shared with another decode call.
//!
//! Maps are kept as ordered entry lists rather than hash maps:
//!
//! - insertion order is observable in the rendered output,
//! - keys may be any `Value` (arrays, maps, tags), not only primitives,
//! - duplicate keys read off the wire are preserved until a rewrite pass
//!   applies mapping semantics through [`map_insert`].

/// One node of a decoded structured-binary tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Major types 0 and 1. The full CBOR range (-2^64 .. 2^64-1) fits in `i128`.
    Integer(i128),
    /// Byte string (definite or indefinite length, already concatenated).
    Bytes(Vec<u8>),
    /// UTF-8 text string.
    Text(String),
    Bool(bool),
    /// `null` and `undefined` both decode to `Null`.
    Null,
    /// Half, single and double precision floats, widened to `f64`.
    Float(f64),
    Array(Vec<Value>),
    /// Ordered key/value entries.
    Map(Vec<(Value, Value)>),
    /// Semantic tag wrapping an inner value.
    Tag(u64, Box<Value>),
}

impl Value {
    /// Short lowercase name of the node kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Null => "null",
            Self::Float(_) => "float",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Tag(_, _) => "tag",
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Strip any number of semantic tags and return the innermost value.
    #[must_use]
    pub fn untagged(&self) -> &Value {
        let mut current = self;
        while let Self::Tag(_, inner) = current {
            current = inner;
        }
        current
    }

    /// Convert a parsed JSON document into a `Value` tree.
    ///
    /// Object keys stay text. Integral numbers become `Integer`, every other
    /// number becomes `Float`.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Integer(i128::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(obj) => Self::Map(
                obj.iter()
                    .map(|(k, v)| (Self::Text(k.clone()), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Insert `key → value` with mapping semantics.
///
/// If an equal key is already present its value is replaced in place (the
/// entry keeps its original position); otherwise the entry is appended.
/// Values are replaced, never merged.
pub fn map_insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}
