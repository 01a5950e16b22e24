//! Purpose UUIDs of role-based registration envelopes (key 0).
//!
//! The table of known purposes is a fixed domain convention; entries are
//! matched on the canonical lowercase hyphenated form.

use metadecode_kernel::value::model::Value;
use uuid::Uuid;

use crate::fields::{hex_text, key_bytes};

/// Known purposes and their descriptions.
pub const KNOWN_PURPOSES: [(&str, &str); 2] = [
    (
        "ca7a1457-ef9f-4c7f-9c74-7f8c4a4cfa6c",
        "Project Catalyst User Role Registrations",
    ),
    (
        "ca7ad312-a19b-4412-ad53-2a36fb14e2e5",
        "Project Catalyst Admin Role Registrations",
    ),
];

/// Every Catalyst purpose UUID starts with this prefix.
pub const CATALYST_PREFIX: &str = "ca7a";

const UNKNOWN_PURPOSE: &str = "Unknown purpose";

/// Lookup result for one purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurposeInfo {
    pub uuid: String,
    pub description: &'static str,
    pub is_catalyst: bool,
    pub is_known: bool,
}

impl PurposeInfo {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uuid": self.uuid,
            "description": self.description,
            "is_catalyst": self.is_catalyst,
            "is_known": self.is_known,
        })
    }
}

/// Canonical text of a purpose field.
///
/// Sixteen raw bytes (possibly under tag 37, or as hex text) become the
/// hyphenated lowercase UUID. Anything else is kept in its hex-text form.
#[must_use]
pub fn purpose_uuid_text(value: &Value) -> String {
    if let Ok(bytes) = key_bytes(value) {
        if let Ok(uuid) = Uuid::from_slice(&bytes) {
            return uuid.hyphenated().to_string();
        }
    }
    if let Some(Ok(uuid)) = value.untagged().as_text().map(Uuid::parse_str) {
        return uuid.hyphenated().to_string();
    }
    hex_text(value)
}

/// Look `uuid` up in [`KNOWN_PURPOSES`].
#[must_use]
pub fn purpose_info(uuid: &str) -> PurposeInfo {
    let known = KNOWN_PURPOSES.iter().find(|(id, _)| *id == uuid);
    PurposeInfo {
        uuid: uuid.to_owned(),
        description: known.map_or(UNKNOWN_PURPOSE, |(_, description)| *description),
        is_catalyst: uuid.starts_with(CATALYST_PREFIX),
        is_known: known.is_some(),
    }
}
