//! `RbacStructureParser`: reads the reconstructed role-based access control
//! map of an X.509 envelope.
//!
//! Three keys are understood:
//!
//! - `10`: certificate list; the first element is the certificate blob,
//!   scanned for an embedded `web+cardano://addr/<stake address>` URI and
//!   an Ed25519 subject key,
//! - `30`: passed through,
//! - `100`: role entries; each map element is parsed into an
//!   [`RbacRoleEntry`].
//!
//! The parser never fails. A top-level shape problem becomes
//! [`RbacParseResult::Failed`], a certificate problem becomes an error in
//! the certificate slot, and everything else is best-effort.

use std::sync::OnceLock;

use metadecode_kernel::value::model::Value;
use metadecode_kernel::value::render::{key_label, to_json};
use regex::Regex;

use crate::fields::{key_bytes, key_index};
use crate::normalize::VoterDelegation;

/// URI scheme marking the embedded stake address.
pub const STAKE_URI_PATTERN: &str = r"web\+cardano://addr/(stake[A-Za-z0-9]+)";

/// Hex prefix of a DER SEQUENCE with a two-byte length.
pub const ASN1_SEQUENCE_HEX_PREFIX: &str = "30820";

/// DER encoding of the Ed25519 algorithm OID 1.3.101.112.
pub const ED25519_OID: [u8; 5] = [0x06, 0x03, 0x2b, 0x65, 0x70];

/// BIT STRING header of a 32-byte key with zero unused bits.
pub const ED25519_KEY_MARKER: [u8; 3] = [0x03, 0x21, 0x00];

const ED25519_KEY_LEN: usize = 32;

static STAKE_URI: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// What the certificate scan found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub length: usize,
    /// Informational only: the blob starts like a DER SEQUENCE.
    pub has_asn1_structure: bool,
    pub cardano_uri_found: bool,
    /// Captured stake address with its final character removed.
    pub stake_address: Option<String>,
    /// Hex of the Ed25519 subject key, when one could be located.
    pub subject_public_key: Option<String>,
}

impl CertificateInfo {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "length": self.length,
            "has_asn1_structure": self.has_asn1_structure,
            "cardano_uri_found": self.cardano_uri_found,
            "stake_address": self.stake_address,
            "subject_public_key": self.subject_public_key,
        })
    }
}

/// Reference from a role to a key inside a certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningKeyRef {
    pub certificate_index: Value,
    pub key_index: Value,
}

/// One parsed role entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RbacRoleEntry {
    /// Role number (key 0) and every unrecognised key, in map order.
    pub role_assignments: Vec<(Value, Value)>,
    pub signing_key_ref: Option<SigningKeyRef>,
    pub payment_key_ref: Option<Value>,
}

impl RbacRoleEntry {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let assignments: serde_json::Map<String, serde_json::Value> = self
            .role_assignments
            .iter()
            .map(|(k, v)| (key_label(k), to_json(v)))
            .collect();
        serde_json::json!({
            "role_assignments": assignments,
            "signing_key_ref": self.signing_key_ref.as_ref().map(|r| serde_json::json!({
                "certificate_index": to_json(&r.certificate_index),
                "key_index": to_json(&r.key_index),
            })),
            "payment_key_ref": self.payment_key_ref.as_ref().map(to_json),
        })
    }
}

/// Everything read out of a well-shaped RBAC map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RbacStructure {
    pub map_keys: Vec<Value>,
    /// `Err` carries the reason the certificate could not be scanned.
    pub certificate: Option<Result<CertificateInfo, String>>,
    pub key_30: Option<Value>,
    /// First role entry; kept alongside `roles` for older consumers.
    pub role_data: Option<RbacRoleEntry>,
    pub roles: Vec<RbacRoleEntry>,
    pub stake_key: Option<String>,
    /// The four fields below override the normalized record when set.
    /// [`parse`] never fills them: no known RBAC map carries this data.
    pub payment_address: Option<String>,
    pub voter_delegations: Option<Vec<VoterDelegation>>,
    pub nonce: Option<Value>,
    pub voting_purpose: Option<Value>,
}

/// Outcome of [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum RbacParseResult {
    Parsed(RbacStructure),
    Failed { error: String },
}

impl RbacParseResult {
    #[must_use]
    pub fn structure(&self) -> Option<&RbacStructure> {
        match self {
            Self::Parsed(s) => Some(s),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let s = match self {
            Self::Parsed(s) => s,
            Self::Failed { error } => return serde_json::json!({ "error": error }),
        };

        let mut extracted = serde_json::Map::new();
        if let Some(cert) = &s.certificate {
            let json = match cert {
                Ok(info) => info.to_json(),
                Err(error) => serde_json::json!({ "error": error }),
            };
            extracted.insert("certificate".into(), json);
        }
        if let Some(v) = &s.key_30 {
            extracted.insert("key_30".into(), to_json(v));
        }
        if let Some(role) = &s.role_data {
            extracted.insert("role_data".into(), role.to_json());
        }

        let mut out = serde_json::json!({
            "structure_type": "cbor_map",
            "map_keys": s.map_keys.iter().map(to_json).collect::<Vec<_>>(),
            "extracted_data": extracted,
            "stake_key": s.stake_key,
            "payment_address": s.payment_address,
            "voter_delegations": s.voter_delegations.as_ref().map(|ds| {
                ds.iter().map(VoterDelegation::to_json).collect::<Vec<_>>()
            }),
            "roles": s.roles.iter().map(RbacRoleEntry::to_json).collect::<Vec<_>>(),
        });
        if let Some(obj) = out.as_object_mut() {
            if let Some(v) = &s.nonce {
                obj.insert("nonce".into(), to_json(v));
            }
            if let Some(v) = &s.voting_purpose {
                obj.insert("voting_purpose".into(), to_json(v));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a decoded RBAC structure.
#[must_use]
pub fn parse(value: &Value) -> RbacParseResult {
    let Some(entries) = value.untagged().as_map() else {
        return RbacParseResult::Failed {
            error: format!("expected a map, found {}", value.untagged().kind()),
        };
    };

    let mut out = RbacStructure {
        map_keys: entries.iter().map(|(k, _)| k.clone()).collect(),
        ..RbacStructure::default()
    };

    for (key, value) in entries {
        match key_index(key) {
            Some(10) => {
                if let Some(first) = value.untagged().as_array().and_then(<[Value]>::first) {
                    let cert = parse_certificate(first);
                    if let Ok(info) = &cert {
                        if info.stake_address.is_some() {
                            out.stake_key.clone_from(&info.stake_address);
                        }
                    }
                    out.certificate = Some(cert);
                }
            }
            Some(30) => out.key_30 = Some(value.clone()),
            Some(100) => {
                if let Some(items) = value.untagged().as_array() {
                    out.roles = items
                        .iter()
                        .filter_map(|item| item.untagged().as_map().map(parse_role_entry))
                        .collect();
                    out.role_data = items
                        .first()
                        .and_then(|first| first.untagged().as_map().map(parse_role_entry));
                }
            }
            _ => {}
        }
    }

    RbacParseResult::Parsed(out)
}

/// Scan a certificate blob.
///
/// # Errors
///
/// A reason string when the blob has no byte form or the URI pattern
/// cannot be compiled.
pub fn parse_certificate(blob: &Value) -> Result<CertificateInfo, String> {
    let bytes = key_bytes(blob)?;
    let stake_uri = STAKE_URI
        .get_or_init(|| Regex::new(STAKE_URI_PATTERN))
        .as_ref()
        .map_err(ToString::to_string)?;

    // Invalid UTF-8 sequences are dropped, not replaced, so a URI split by
    // stray binary still matches.
    let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
    let captured = stake_uri
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned());

    Ok(CertificateInfo {
        length: bytes.len(),
        has_asn1_structure: hex::encode(&bytes).starts_with(ASN1_SEQUENCE_HEX_PREFIX),
        cardano_uri_found: captured.is_some(),
        stake_address: captured.as_deref().map(strip_last_char),
        subject_public_key: find_ed25519_key(&bytes).map(hex::encode),
    })
}

/// Drop exactly one trailing character of a captured stake address.
#[must_use]
pub fn strip_last_char(token: &str) -> String {
    let mut chars = token.chars();
    chars.next_back();
    chars.as_str().to_owned()
}

/// 32 bytes after the first key marker that follows the Ed25519 OID.
/// All-zero keys are rejected.
#[must_use]
pub fn find_ed25519_key(der: &[u8]) -> Option<&[u8]> {
    let oid_at = find(der, &ED25519_OID)?;
    let marker_at = oid_at + find(&der[oid_at..], &ED25519_KEY_MARKER)?;
    let start = marker_at + ED25519_KEY_MARKER.len();
    let key = der.get(start..start + ED25519_KEY_LEN)?;
    if key.iter().all(|b| *b == 0) {
        None
    } else {
        Some(key)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_role_entry(entries: &[(Value, Value)]) -> RbacRoleEntry {
    let mut role = RbacRoleEntry::default();
    for (key, value) in entries {
        match key_index(key) {
            Some(1) => {
                if let Some([cert, key]) = value.untagged().as_array() {
                    role.signing_key_ref = Some(SigningKeyRef {
                        certificate_index: cert.clone(),
                        key_index: key.clone(),
                    });
                }
            }
            Some(3) => role.payment_key_ref = Some(value.clone()),
            // Key 0 (the role number) and every other key.
            _ => role.role_assignments.push((key.clone(), value.clone())),
        }
    }
    role
}
