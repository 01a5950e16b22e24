//! Hex text helpers shared by the resolver and the metadata layers.

/// True if `s` is a non-empty, even-length run of ASCII hex digits.
///
/// This is the only shape the resolver will hex-decode. A `0x` prefix is
/// NOT accepted here; callers that tolerate it strip it first with
/// [`strip_hex_prefix`].
#[must_use]
pub fn is_hex_payload(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Remove one leading `0x` / `0X` prefix, if present.
#[must_use]
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode hex text, tolerating a leading `0x` prefix.
///
/// # Errors
///
/// Returns the underlying [`hex::FromHexError`] on odd length or a
/// non-hex character.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_hex_prefix(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_payload_shape() {
        assert!(is_hex_payload("00ff"));
        assert!(is_hex_payload("ABcd"));
        assert!(!is_hex_payload(""));
        assert!(!is_hex_payload("abc"));
        assert!(!is_hex_payload("0x00"));
        assert!(!is_hex_payload("zz"));
    }

    #[test]
    fn prefix_is_stripped_once() {
        assert_eq!(strip_hex_prefix("0x0x12"), "0x12");
        assert_eq!(strip_hex_prefix("0XAB"), "AB");
        assert_eq!(strip_hex_prefix("ab"), "ab");
    }

    #[test]
    fn decode_prefixed_accepts_both_forms() {
        assert_eq!(decode_prefixed("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_prefixed("0102").unwrap(), vec![1, 2]);
        assert!(decode_prefixed("0x012").is_err());
    }
}
