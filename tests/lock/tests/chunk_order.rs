//! Chunked payloads are concatenated in the order given, never sorted.

use lock_tests::fixtures::{brotli_compress, encode, int, text, zstd_compress};
use metadecode_kernel::compression::{CompressionAlgorithm, DecompressLimits};
use metadecode_kernel::value::model::Value;
use metadecode_registration::chunked::{
    parse_compression, reconstruct, reconstruct_and_parse, ChunkError, ChunkedPayload,
};

// ---------------------------------------------------------------------------
// ACCEPTANCE: CHUNK-ORDER
// ---------------------------------------------------------------------------

#[test]
fn hex_chunks_concatenate_in_given_order() {
    let chunks = [text("68656c6c6f"), text("6f20776f726c64")];
    assert_eq!(reconstruct(&chunks).unwrap(), b"helloo world".to_vec());

    let reversed = [text("6f20776f726c64"), text("68656c6c6f")];
    assert_eq!(reconstruct(&reversed).unwrap(), b"o worldhello".to_vec());
}

#[test]
fn compressed_stream_split_across_chunks_reassembles() {
    let payload = Value::Map(vec![(int(10), Value::Array(vec![text("certificate")]))]);
    let expected = encode(&payload);

    for (algorithm, compressed) in [
        (CompressionAlgorithm::Brotli, brotli_compress(&expected)),
        (CompressionAlgorithm::Zstd, zstd_compress(&expected)),
    ] {
        let third = compressed.len() / 3;
        let chunks = Value::Array(vec![
            Value::Bytes(compressed[..third].to_vec()),
            Value::Text(hex::encode(&compressed[third..2 * third])),
            Value::Bytes(compressed[2 * third..].to_vec()),
        ]);
        match reconstruct_and_parse(&chunks, algorithm, &DecompressLimits::default()) {
            ChunkedPayload::Decoded { data, value } => {
                assert_eq!(data, expected);
                assert_eq!(value, payload);
            }
            ChunkedPayload::Failed { error, .. } => panic!("{algorithm}: {error}"),
        }
    }
}

#[test]
fn non_chunk_element_names_its_index() {
    let err = reconstruct(&[text("00"), int(5)]).unwrap_err();
    assert!(matches!(err, ChunkError::InvalidChunk { index: 1, .. }));
}

#[test]
fn unknown_compression_label_is_fatal() {
    let err = parse_compression("lz4").unwrap_err();
    assert!(matches!(err, ChunkError::UnknownCompressionType { ref label } if label == "lz4"));
    assert_eq!(parse_compression("zstd").unwrap(), CompressionAlgorithm::Zstd);
}
