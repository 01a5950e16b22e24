//! Envelope classification of a decoded top-level metadata map.
//!
//! # Rules (evaluated in order)
//!
//! 1. Keys include 0, at least one of {10, 11, 12}, and 99 →
//!    [`EnvelopeKind::X509RbacEnvelope`]. Checked first: its key space
//!    overlaps the registration schemas' numeric keys.
//! 2. Key 1 holds a single voting key → [`EnvelopeKind::VoterRegistrationV1`].
//!    A single key is a non-empty array whose first element is not itself
//!    an array (a byte array), or a non-empty byte string / text.
//! 3. Otherwise → [`EnvelopeKind::VoterRegistrationV2`].

use metadecode_kernel::value::model::Value;

use crate::fields::{key_index, lookup};

/// Known metadata schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// CIP-15: one voting key, implicit weight 1.
    VoterRegistrationV1,
    /// CIP-36: weighted delegations to several voting keys. Default.
    VoterRegistrationV2,
    /// CIP-509 style X.509 role-based access control envelope.
    X509RbacEnvelope,
}

impl EnvelopeKind {
    /// Stable label used in rendered output (`cip15`, `cip36`, `x509_envelope`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VoterRegistrationV1 => "cip15",
            Self::VoterRegistrationV2 => "cip36",
            Self::X509RbacEnvelope => "x509_envelope",
        }
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The metadata handed to the normalizer has no map at its root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("metadata is not a map (found {found})")]
    NotAMap { found: &'static str },
}

/// Classify a top-level map by its key set.
#[must_use]
pub fn classify(entries: &[(Value, Value)]) -> EnvelopeKind {
    let has = |index: i128| entries.iter().any(|(k, _)| key_index(k) == Some(index));

    if has(0) && (has(10) || has(11) || has(12)) && has(99) {
        return EnvelopeKind::X509RbacEnvelope;
    }
    if lookup(entries, 1).is_some_and(is_single_voting_key) {
        return EnvelopeKind::VoterRegistrationV1;
    }
    EnvelopeKind::VoterRegistrationV2
}

fn is_single_voting_key(value: &Value) -> bool {
    match value.untagged() {
        Value::Array(items) => items.first().is_some_and(|first| first.as_array().is_none()),
        Value::Bytes(b) => !b.is_empty(),
        Value::Text(s) => !s.is_empty(),
        _ => false,
    }
}
