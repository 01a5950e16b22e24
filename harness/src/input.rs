//! Input loading: file or stdin, size-guarded, with hex-text detection.

use std::io::Read;
use std::path::Path;

use metadecode_kernel::value::hex_text::{is_hex_payload, strip_hex_prefix};

/// Typed failures at the input boundary.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("empty input data")]
    Empty,
    #[error("input too large: more than {limit} bytes")]
    TooLarge { limit: usize },
    #[error("could not read input: {detail}")]
    Io { detail: String },
}

/// Read `path`, or stdin when `path` is `None`, then [`prepare`] it.
///
/// # Errors
///
/// See [`read`] and [`prepare`].
pub fn load(path: Option<&Path>, max_bytes: usize) -> Result<Vec<u8>, InputError> {
    prepare(read(path, max_bytes)?)
}

/// Raw bytes of `path`, or of stdin when `path` is `None`.
///
/// # Errors
///
/// See [`read_bounded`]; a file that cannot be opened is [`InputError::Io`].
pub fn read(path: Option<&Path>, max_bytes: usize) -> Result<Vec<u8>, InputError> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| InputError::Io {
                detail: format!("{}: {e}", path.display()),
            })?;
            read_bounded(file, max_bytes)
        }
        None => read_bounded(std::io::stdin().lock(), max_bytes),
    }
}

/// Read at most `max_bytes` from `reader`.
///
/// # Errors
///
/// [`InputError::TooLarge`] if the reader holds more, [`InputError::Io`] on
/// read failure.
pub fn read_bounded(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, InputError> {
    let mut buf = Vec::new();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(limit)
        .read_to_end(&mut buf)
        .map_err(|e| InputError::Io {
            detail: e.to_string(),
        })?;
    if buf.len() > max_bytes {
        return Err(InputError::TooLarge { limit: max_bytes });
    }
    Ok(buf)
}

/// Reject empty input and hex-decode ASCII hex text.
///
/// Hex text may carry one `0x` prefix and surrounding whitespace. Anything
/// else is returned unchanged.
///
/// # Errors
///
/// [`InputError::Empty`] if there are no bytes.
pub fn prepare(raw: Vec<u8>) -> Result<Vec<u8>, InputError> {
    if raw.is_empty() {
        return Err(InputError::Empty);
    }
    let decoded = std::str::from_utf8(&raw).ok().and_then(|text| {
        let bare = strip_hex_prefix(text.trim());
        if is_hex_payload(bare) {
            hex::decode(bare).ok()
        } else {
            None
        }
    });
    Ok(decoded.unwrap_or(raw))
}
