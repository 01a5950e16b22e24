//! Structural recognition of signed envelopes (COSE_Sign / COSE_Sign1).
//!
//! Only the shape is checked; signatures are reported, never verified.
//!
//! ```text
//! COSE_Sign  = 98([protected: bstr, unprotected: map, payload: bstr / nil,
//!                  signatures: [+ [protected: bstr, unprotected: map, signature: bstr]]])
//! COSE_Sign1 = 18([protected: bstr, unprotected: map, payload: bstr / nil,
//!                  signature: bstr])
//! ```
//!
//! Untagged arrays are not treated as envelopes: a bare four-element array
//! is just as likely to be a document payload.

use metadecode_kernel::value::cbor;
use metadecode_kernel::value::model::Value;
use metadecode_kernel::value::render::to_json;

/// Tag of a multi-signer envelope.
pub const TAG_COSE_SIGN: u64 = 98;

/// Tag of a single-signer envelope.
pub const TAG_COSE_SIGN1: u64 = 18;

/// Inputs shorter than this are never envelopes.
pub const MIN_ENVELOPE_BYTES: usize = 10;

/// Header label of the key identifier.
pub const HEADER_KID: i128 = 4;

/// Which envelope shape was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeForm {
    Sign,
    Sign1,
}

impl EnvelopeForm {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sign => "cose_sign",
            Self::Sign1 => "cose_sign1",
        }
    }
}

/// One signer of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSignature {
    /// Key identifier: UTF-8 text when it is valid UTF-8, hex otherwise.
    pub kid: Option<String>,
    /// Decoded protected header map of this signer.
    pub protected: Value,
    pub signature: Vec<u8>,
}

impl CoseSignature {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kid": self.kid,
            "protected": to_json(&self.protected),
            "signature": hex::encode(&self.signature),
        })
    }
}

/// A structurally valid envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseEnvelope {
    pub form: EnvelopeForm,
    /// Decoded protected header map (an empty map when the bstr is empty).
    pub protected: Value,
    pub unprotected: Value,
    /// `None` for a detached payload.
    pub payload: Option<Vec<u8>>,
    pub signatures: Vec<CoseSignature>,
}

impl CoseEnvelope {
    /// Header and signer summary; the payload is rendered by the caller.
    #[must_use]
    pub fn headers_json(&self) -> serde_json::Value {
        serde_json::json!({
            "envelope": self.form.label(),
            "protected_headers": to_json(&self.protected),
            "unprotected_headers": to_json(&self.unprotected),
            "signatures": self.signatures.iter().map(CoseSignature::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Recognise an envelope in `bytes`. `None` means "not an envelope".
#[must_use]
pub fn unwrap(bytes: &[u8]) -> Option<CoseEnvelope> {
    if bytes.len() < MIN_ENVELOPE_BYTES {
        return None;
    }
    let Value::Tag(tag, inner) = cbor::decode(bytes).ok()? else {
        return None;
    };
    let form = match tag {
        TAG_COSE_SIGN => EnvelopeForm::Sign,
        TAG_COSE_SIGN1 => EnvelopeForm::Sign1,
        _ => return None,
    };
    let [protected, unprotected, payload, last] = inner.as_array()? else {
        return None;
    };

    let protected = decode_header(protected)?;
    let unprotected = unprotected.as_map().map(|_| unprotected.clone())?;
    let payload = match payload {
        Value::Bytes(b) => Some(b.clone()),
        Value::Null => None,
        _ => return None,
    };

    let signatures = match form {
        EnvelopeForm::Sign => last
            .as_array()?
            .iter()
            .map(signer)
            .collect::<Option<Vec<_>>>()?,
        EnvelopeForm::Sign1 => vec![CoseSignature {
            kid: find_kid(&protected, &unprotected),
            protected: protected.clone(),
            signature: last.as_bytes()?.to_vec(),
        }],
    };

    Some(CoseEnvelope {
        form,
        protected,
        unprotected,
        payload,
        signatures,
    })
}

fn signer(value: &Value) -> Option<CoseSignature> {
    let [protected, unprotected, signature] = value.as_array()? else {
        return None;
    };
    let protected = decode_header(protected)?;
    unprotected.as_map()?;
    Some(CoseSignature {
        kid: find_kid(&protected, unprotected),
        protected,
        signature: signature.as_bytes()?.to_vec(),
    })
}

/// A protected header is a bstr holding an encoded map; empty means `{}`.
fn decode_header(value: &Value) -> Option<Value> {
    let bytes = value.as_bytes()?;
    if bytes.is_empty() {
        return Some(Value::Map(Vec::new()));
    }
    match cbor::decode(bytes).ok()? {
        map @ Value::Map(_) => Some(map),
        _ => None,
    }
}

fn find_kid(protected: &Value, unprotected: &Value) -> Option<String> {
    [protected, unprotected].into_iter().find_map(|headers| {
        headers
            .as_map()?
            .iter()
            .find(|(k, _)| k.as_integer() == Some(HEADER_KID))
            .and_then(|(_, v)| match v {
                Value::Bytes(b) => Some(
                    String::from_utf8(b.clone()).unwrap_or_else(|_| hex::encode(b)),
                ),
                Value::Text(s) => Some(s.clone()),
                _ => None,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::value::Value as Raw;

    fn encode(value: &Raw) -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out).unwrap();
        out
    }

    fn protected_header(kid: Option<&[u8]>) -> Vec<u8> {
        let mut entries = vec![(Raw::Integer(1.into()), Raw::Integer((-8).into()))];
        if let Some(kid) = kid {
            entries.push((Raw::Integer(4.into()), Raw::Bytes(kid.to_vec())));
        }
        encode(&Raw::Map(entries))
    }

    fn sign(payload: Raw) -> Vec<u8> {
        let signer = Raw::Array(vec![
            Raw::Bytes(protected_header(Some(b"signer-1"))),
            Raw::Map(vec![]),
            Raw::Bytes(vec![0x55; 64]),
        ]);
        encode(&Raw::Tag(
            TAG_COSE_SIGN,
            Box::new(Raw::Array(vec![
                Raw::Bytes(protected_header(None)),
                Raw::Map(vec![]),
                payload,
                Raw::Array(vec![signer]),
            ])),
        ))
    }

    #[test]
    fn multi_signer_envelope_is_recognised() {
        let env = unwrap(&sign(Raw::Bytes(b"payload".to_vec()))).unwrap();
        assert_eq!(env.form, EnvelopeForm::Sign);
        assert_eq!(env.payload.as_deref(), Some(&b"payload"[..]));
        assert_eq!(env.signatures.len(), 1);
        assert_eq!(env.signatures[0].kid.as_deref(), Some("signer-1"));
        assert_eq!(env.signatures[0].signature, vec![0x55; 64]);

        let json = env.headers_json();
        assert_eq!(json["envelope"], "cose_sign");
        assert_eq!(json["protected_headers"]["1"], -8);
        assert_eq!(json["signatures"][0]["signature"], hex::encode([0x55; 64]));
    }

    #[test]
    fn single_signer_envelope_is_recognised() {
        let bytes = encode(&Raw::Tag(
            TAG_COSE_SIGN1,
            Box::new(Raw::Array(vec![
                Raw::Bytes(protected_header(Some(&[0xff, 0x00]))),
                Raw::Map(vec![]),
                Raw::Null,
                Raw::Bytes(vec![0x77; 64]),
            ])),
        ));
        let env = unwrap(&bytes).unwrap();
        assert_eq!(env.form, EnvelopeForm::Sign1);
        assert_eq!(env.payload, None);
        assert_eq!(env.signatures[0].kid.as_deref(), Some("ff00"));
    }

    #[test]
    fn untagged_or_misshapen_arrays_are_not_envelopes() {
        let untagged = encode(&Raw::Array(vec![
            Raw::Bytes(vec![]),
            Raw::Map(vec![]),
            Raw::Bytes(vec![0; 16]),
            Raw::Array(vec![]),
        ]));
        assert!(unwrap(&untagged).is_none());

        let three = encode(&Raw::Tag(
            TAG_COSE_SIGN,
            Box::new(Raw::Array(vec![
                Raw::Bytes(vec![]),
                Raw::Map(vec![]),
                Raw::Bytes(vec![0; 16]),
            ])),
        ));
        assert!(unwrap(&three).is_none());

        assert!(unwrap(&sign(Raw::Integer(5.into()))).is_none());
    }

    #[test]
    fn short_input_is_never_an_envelope() {
        assert!(unwrap(&[0xd8, 0x62, 0x84, 0x40, 0xa0, 0xf6, 0x80]).is_none());
    }
}
