//! Decode-only compression adapter over {raw, Brotli, Zstd}.
//!
//! Every algorithm sits behind the same call, [`decompress`], so callers can
//! iterate over candidate algorithms. A failure here means "not this
//! format": the resolver moves on to the next candidate, and only the
//! chunked-payload path (where the algorithm is declared, not guessed)
//! reports it to the user.
//!
//! Output is capped by [`DecompressLimits::max_output_bytes`] so a small
//! adversarial stream cannot expand without bound.

use std::io::Read;

/// Default cap on the decompressed size of a single stream (64 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

/// Internal buffer size handed to the Brotli decoder.
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Compression algorithm of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// Identity: bytes are returned unchanged.
    Raw,
    Brotli,
    Zstd,
}

impl CompressionAlgorithm {
    /// Stable lowercase label (`raw`, `brotli`, `zstd`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Brotli => "brotli",
            Self::Zstd => "zstd",
        }
    }

    /// Parse a label produced by [`Self::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "raw" => Some(Self::Raw),
            "brotli" => Some(Self::Brotli),
            "zstd" => Some(Self::Zstd),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resource limits for decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressLimits {
    /// Maximum number of bytes a single stream may expand to.
    pub max_output_bytes: usize,
}

impl Default for DecompressLimits {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

/// Typed failure for a decompression attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompressError {
    /// The input is not a valid stream for the attempted algorithm.
    #[error("invalid {algorithm} stream: {detail}")]
    InvalidStream {
        algorithm: CompressionAlgorithm,
        detail: String,
    },
    /// The stream expands beyond [`DecompressLimits::max_output_bytes`].
    #[error("{algorithm} output exceeds {limit} bytes")]
    OutputTooLarge {
        algorithm: CompressionAlgorithm,
        limit: usize,
    },
}

/// Decompress `bytes` with `algorithm`.
///
/// `Raw` returns the input unchanged (the output cap still applies).
///
/// # Errors
///
/// Returns [`DecompressError::InvalidStream`] if `bytes` is empty or not a
/// complete stream of the given algorithm, and
/// [`DecompressError::OutputTooLarge`] if the output would exceed the cap.
pub fn decompress(
    bytes: &[u8],
    algorithm: CompressionAlgorithm,
    limits: &DecompressLimits,
) -> Result<Vec<u8>, DecompressError> {
    match algorithm {
        CompressionAlgorithm::Raw => {
            if bytes.len() > limits.max_output_bytes {
                return Err(DecompressError::OutputTooLarge {
                    algorithm,
                    limit: limits.max_output_bytes,
                });
            }
            Ok(bytes.to_vec())
        }
        CompressionAlgorithm::Brotli => {
            reject_empty(bytes, algorithm)?;
            let reader = brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE);
            read_bounded(reader, algorithm, limits.max_output_bytes)
        }
        CompressionAlgorithm::Zstd => {
            reject_empty(bytes, algorithm)?;
            let reader = zstd::stream::read::Decoder::new(bytes).map_err(|e| {
                DecompressError::InvalidStream {
                    algorithm,
                    detail: format!("decoder init: {e}"),
                }
            })?;
            read_bounded(reader, algorithm, limits.max_output_bytes)
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn reject_empty(bytes: &[u8], algorithm: CompressionAlgorithm) -> Result<(), DecompressError> {
    if bytes.is_empty() {
        return Err(DecompressError::InvalidStream {
            algorithm,
            detail: "empty input".into(),
        });
    }
    Ok(())
}

fn read_bounded<R: Read>(
    reader: R,
    algorithm: CompressionAlgorithm,
    limit: usize,
) -> Result<Vec<u8>, DecompressError> {
    let mut out = Vec::new();
    // One byte past the limit is enough to detect an overrun.
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(cap)
        .read_to_end(&mut out)
        .map_err(|e| DecompressError::InvalidStream {
            algorithm,
            detail: e.to_string(),
        })?;
    if out.len() > limit {
        return Err(DecompressError::OutputTooLarge { algorithm, limit });
    }
    Ok(out)
}
