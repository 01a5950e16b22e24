//! Document decode: signed envelope first, direct structured decode second,
//! a hex preview with the failure reason last.
//!
//! Every path runs one [`RecoveryBudget`] shared by the whole document, so
//! `max_steps` bounds the total work of a decode regardless of how many
//! payload elements there are.
//!
//! # Payload handling
//!
//! A Catalyst document payload is an array whose element 1 usually holds
//! the Brotli-compressed proposal body. That element, when it is a byte
//! string or hex text, is decompressed and interpreted directly; every
//! other element (and element 1 when decompression fails) goes through the
//! [`RecursiveResolver`]. A payload that is not an array is resolved as a
//! whole.

use metadecode_kernel::compression::{decompress, CompressionAlgorithm};
use metadecode_kernel::recovery::budget::{RecoveryBudget, RecoveryLimits};
use metadecode_kernel::recovery::diagnostics::DiagnosticSink;
use metadecode_kernel::recovery::resolver::RecursiveResolver;
use metadecode_kernel::value::cbor;
use metadecode_kernel::value::hex_text::is_hex_payload;
use metadecode_kernel::value::model::Value;
use metadecode_kernel::value::render::to_json;

use crate::cose::{self, CoseEnvelope};

const STAGE: &str = "document";

/// Index of the compressed body inside a payload array.
pub const BODY_INDEX: usize = 1;

/// Bytes of raw input kept in an undecodable preview.
pub const PREVIEW_BYTES: usize = 1000;

/// Characters of the failure message kept in an undecodable report.
pub const ERROR_CHARS: usize = 200;

/// Inputs shorter than this are not decoded directly.
pub const MIN_DIRECT_BYTES: usize = 2;

/// The payload of a signed envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopePayload {
    /// Decompressed, decoded and resolved.
    Decoded(Value),
    /// Not a compressed structured payload; reported as hex.
    Raw(Vec<u8>),
    /// The envelope carries no payload.
    Detached,
}

impl EnvelopePayload {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Decoded(value) => to_json(value),
            Self::Raw(bytes) => serde_json::Value::String(hex::encode(bytes)),
            Self::Detached => serde_json::Value::Null,
        }
    }
}

/// Result of decoding one document input.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDocument {
    Signed {
        envelope: CoseEnvelope,
        payload: EnvelopePayload,
    },
    Direct {
        payload: Value,
    },
    Undecodable {
        preview: String,
        error: String,
    },
}

impl DecodedDocument {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Signed { envelope, payload } => {
                let mut out = envelope.headers_json();
                out["payload"] = payload.to_json();
                out
            }
            Self::Direct { payload } => serde_json::json!({ "payload": to_json(payload) }),
            Self::Undecodable { preview, error } => serde_json::json!({
                "payload": preview,
                "payload_error": format!("Failed to decode: {error}"),
            }),
        }
    }
}

/// Decode a whole document input. Never fails; see [`DecodedDocument`].
pub fn decode_document(
    bytes: &[u8],
    limits: &RecoveryLimits,
    sink: &mut dyn DiagnosticSink,
) -> DecodedDocument {
    let mut budget = RecoveryBudget::new(limits);
    let mut resolver = RecursiveResolver::new(&mut budget, limits.decompress, sink);

    if let Some(envelope) = cose::unwrap(bytes) {
        let payload = match &envelope.payload {
            None => EnvelopePayload::Detached,
            Some(body) => signed_payload(&mut resolver, body, limits),
        };
        return DecodedDocument::Signed { envelope, payload };
    }

    if bytes.len() < MIN_DIRECT_BYTES {
        return undecodable(bytes, "input shorter than 2 bytes");
    }
    match cbor::decode(bytes) {
        Ok(value) => DecodedDocument::Direct {
            payload: handle_payload(&mut resolver, value),
        },
        Err(e) => undecodable(bytes, &e.to_string()),
    }
}

/// Resolve a decoded payload, giving the compressed body element its
/// dedicated treatment.
pub fn handle_payload(resolver: &mut RecursiveResolver<'_>, payload: Value) -> Value {
    let Value::Array(items) = payload else {
        return resolver.resolve(payload);
    };
    Value::Array(
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if index == BODY_INDEX {
                    if let Some(body) = decode_body(resolver, &item) {
                        return body;
                    }
                }
                resolver.resolve_at(item, 1)
            })
            .collect(),
    )
}

fn signed_payload(
    resolver: &mut RecursiveResolver<'_>,
    body: &[u8],
    limits: &RecoveryLimits,
) -> EnvelopePayload {
    let decoded = decompress(body, CompressionAlgorithm::Brotli, &limits.decompress)
        .map_err(|e| e.to_string())
        .and_then(|plain| cbor::decode(&plain).map_err(|e| e.to_string()));
    match decoded {
        Ok(value) => EnvelopePayload::Decoded(handle_payload(resolver, value)),
        Err(reason) => {
            resolver
                .sink()
                .debug(STAGE, format!("envelope payload left raw: {reason}"));
            EnvelopePayload::Raw(body.to_vec())
        }
    }
}

fn decode_body(resolver: &mut RecursiveResolver<'_>, item: &Value) -> Option<Value> {
    let owned;
    let bytes = match item {
        Value::Bytes(b) if !b.is_empty() => b.as_slice(),
        Value::Text(t) if is_hex_payload(t) => {
            owned = hex::decode(t).ok()?;
            owned.as_slice()
        }
        _ => return None,
    };
    let plain = decompress(
        bytes,
        CompressionAlgorithm::Brotli,
        &resolver.decompress_limits(),
    )
    .ok()?;
    resolver.interpret_decompressed(&plain, 0)
}

fn undecodable(bytes: &[u8], error: &str) -> DecodedDocument {
    let shown = &bytes[..bytes.len().min(PREVIEW_BYTES)];
    let mut preview = hex::encode(shown);
    if bytes.len() > PREVIEW_BYTES {
        preview.push_str("...");
    }
    let mut message: String = error.chars().take(ERROR_CHARS).collect();
    if error.chars().count() > ERROR_CHARS {
        message.push_str("...");
    }
    DecodedDocument::Undecodable {
        preview,
        error: message,
    }
}
