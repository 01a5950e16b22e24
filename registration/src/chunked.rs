//! `ChunkedPayloadReconstructor`: chunk concatenation, decompression and
//! structured decode of an envelope's split payload.
//!
//! Chunks are joined strictly in input order. Byte strings are taken as-is;
//! text chunks are hex-decoded after one leading `0x` is stripped. No length
//! check is applied here: the I/O boundary caps input size, and
//! [`DecompressLimits`] caps decompressed size.

use metadecode_kernel::compression::{decompress, CompressionAlgorithm, DecompressLimits};
use metadecode_kernel::value::cbor;
use metadecode_kernel::value::model::Value;

use crate::fields::key_bytes;

/// Typed failures of chunk reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// The caller named a compression type outside {raw, brotli, zstd}.
    #[error("unknown compression type: {label}")]
    UnknownCompressionType { label: String },
    /// A chunk is neither a byte string nor hex text.
    #[error("chunk {index}: {detail}")]
    InvalidChunk { index: usize, detail: String },
    /// The chunk container is not an array.
    #[error("expected an array of chunks, found {found}")]
    NotAnArray { found: &'static str },
}

/// Outcome of [`decompress_and_parse`]. Never an `Err`: failures are data.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkedPayload {
    /// `data` is the decompressed blob, `value` its structured decode.
    Decoded { data: Vec<u8>, value: Value },
    /// Reason for the failure and the compression type that was requested.
    Failed {
        error: String,
        compression: CompressionAlgorithm,
    },
}

impl ChunkedPayload {
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Decoded { value, .. } => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

/// Compression type selected by an envelope payload key: 10 → raw,
/// 11 → brotli, 12 → zstd.
#[must_use]
pub const fn compression_for_key(index: i128) -> Option<CompressionAlgorithm> {
    match index {
        10 => Some(CompressionAlgorithm::Raw),
        11 => Some(CompressionAlgorithm::Brotli),
        12 => Some(CompressionAlgorithm::Zstd),
        _ => None,
    }
}

/// Parse a caller-supplied compression label.
///
/// # Errors
///
/// [`ChunkError::UnknownCompressionType`] for anything but `raw`, `brotli`
/// or `zstd`. This is the one fatal error of the reconstructor.
pub fn parse_compression(label: &str) -> Result<CompressionAlgorithm, ChunkError> {
    CompressionAlgorithm::from_label(label).ok_or_else(|| ChunkError::UnknownCompressionType {
        label: label.to_owned(),
    })
}

/// Concatenate chunk contents in order.
///
/// # Errors
///
/// [`ChunkError::InvalidChunk`] naming the first chunk that is neither bytes
/// nor hex text.
pub fn reconstruct(chunks: &[Value]) -> Result<Vec<u8>, ChunkError> {
    let mut blob = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let bytes = match chunk.untagged() {
            Value::Bytes(_) | Value::Text(_) => key_bytes(chunk),
            other => Err(format!("expected bytes or hex text, found {}", other.kind())),
        }
        .map_err(|detail| ChunkError::InvalidChunk { index, detail })?;
        blob.extend_from_slice(&bytes);
    }
    Ok(blob)
}

/// Decompress `blob` with `compression` and decode the result.
#[must_use]
pub fn decompress_and_parse(
    blob: &[u8],
    compression: CompressionAlgorithm,
    limits: &DecompressLimits,
) -> ChunkedPayload {
    let failed = |error: String| ChunkedPayload::Failed { error, compression };
    let data = match decompress(blob, compression, limits) {
        Ok(data) => data,
        Err(e) => return failed(e.to_string()),
    };
    match cbor::decode(&data) {
        Ok(value) => ChunkedPayload::Decoded { data, value },
        Err(e) => failed(e.to_string()),
    }
}

/// [`reconstruct`] then [`decompress_and_parse`], folding reconstruction
/// errors into [`ChunkedPayload::Failed`].
#[must_use]
pub fn reconstruct_and_parse(
    chunks: &Value,
    compression: CompressionAlgorithm,
    limits: &DecompressLimits,
) -> ChunkedPayload {
    let blob = chunks
        .untagged()
        .as_array()
        .ok_or(ChunkError::NotAnArray {
            found: chunks.untagged().kind(),
        })
        .and_then(reconstruct);
    match blob {
        Ok(blob) => decompress_and_parse(&blob, compression, limits),
        Err(e) => ChunkedPayload::Failed {
            error: e.to_string(),
            compression,
        },
    }
}
