//! `RecursiveResolver`: the bounded best-effort format-recovery engine.
//!
//! Given any [`Value`], the resolver keeps peeling hex text, structured
//! encoding and compression off it until no attempt makes progress, and
//! recurses into arrays, maps and tags.
//!
//! # Per-node precedence (first success wins)
//!
//! 1. Text that is non-empty, even-length, all hex digits: hex-decode and
//!    continue as step 2 on the bytes (same node, no extra step).
//! 2. Bytes: run [`BYTE_ATTEMPTS`] in order:
//!    structured decode → Brotli → Zstd. A structured parse only wins
//!    outright if it spans the whole byte string; one that leaves trailing
//!    bytes is used only when no decompression succeeds. A decompressed
//!    stream is interpreted as structured data, then as a JSON document,
//!    then as plain UTF-8 text. When every attempt fails, or the
//!    decompressed bytes are not UTF-8, the node becomes hex text
//!    (terminal fallback).
//! 3. Array: each element at `depth + 1`, order preserved.
//! 4. Map: each value at `depth + 1`; keys too when they are bytes or text.
//!    Entries are rebuilt with mapping semantics ([`map_insert`]).
//! 5. Tag: the inner value at `depth + 1`.
//! 6. Anything else is returned unchanged.
//!
//! # Bounds
//!
//! A node deeper than `max_depth` is returned unchanged. Every visited node
//! consumes one step from the shared [`RecoveryBudget`]; once it is empty,
//! every remaining node is returned as-is. Partial results already built
//! are kept.
//!
//! # Failure semantics
//!
//! Never fails. Lower-level decode/decompress errors are absorbed here and
//! turned into the next fallback.

use crate::compression::{decompress, CompressionAlgorithm, DecompressLimits};
use crate::recovery::budget::{RecoveryBudget, RecoveryLimits};
use crate::recovery::diagnostics::DiagnosticSink;
use crate::value::cbor;
use crate::value::hex_text::is_hex_payload;
use crate::value::model::{map_insert, Value};

const STAGE: &str = "resolver";

/// One fallible transformation tried on a byte-string node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteAttempt {
    /// Parse the bytes as a structured-binary item.
    Structured,
    /// Decompress with the given algorithm and interpret the output.
    Decompress(CompressionAlgorithm),
}

/// Attempt order for byte-string nodes.
pub const BYTE_ATTEMPTS: [ByteAttempt; 3] = [
    ByteAttempt::Structured,
    ByteAttempt::Decompress(CompressionAlgorithm::Brotli),
    ByteAttempt::Decompress(CompressionAlgorithm::Zstd),
];

/// Recovery engine bound to one budget and one diagnostic sink.
pub struct RecursiveResolver<'a> {
    budget: &'a mut RecoveryBudget,
    sink: &'a mut dyn DiagnosticSink,
    decompress_limits: DecompressLimits,
}

impl<'a> RecursiveResolver<'a> {
    pub fn new(
        budget: &'a mut RecoveryBudget,
        decompress_limits: DecompressLimits,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            budget,
            sink,
            decompress_limits,
        }
    }

    /// Resolve `value` as a root node (depth 0).
    pub fn resolve(&mut self, value: Value) -> Value {
        self.resolve_at(value, 0)
    }

    /// Resolve `value` as a node at `depth`.
    pub fn resolve_at(&mut self, value: Value, depth: u32) -> Value {
        if !self.budget.admits_depth(depth) {
            self.sink.debug(
                STAGE,
                format!("depth {depth} exceeds max depth; {} left as-is", value.kind()),
            );
            return value;
        }
        let already_exhausted = self.budget.is_exhausted();
        if !self.budget.try_consume(depth) {
            if !already_exhausted {
                self.sink.warn(
                    STAGE,
                    format!("step budget exhausted at depth {depth}; returning partial result"),
                );
            }
            return value;
        }

        match value {
            Value::Text(text) => self.resolve_text(text, depth),
            Value::Bytes(bytes) => self.resolve_bytes(&bytes, depth),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.resolve_at(item, depth + 1))
                    .collect(),
            ),
            Value::Map(entries) => self.resolve_map(entries, depth),
            Value::Tag(tag, inner) => Value::Tag(tag, Box::new(self.resolve_at(*inner, depth + 1))),
            other => other,
        }
    }

    /// Interpret the output of a successful decompression.
    ///
    /// Tries, in order: a structured item spanning all of `plain`, a JSON
    /// object/array, plain UTF-8 text, and finally a structured item with
    /// trailing bytes. Every success is resolved again at `depth + 1`, so
    /// hex-looking strings inside decompressed JSON are decoded like any
    /// other text and the output stays a fixed point of [`resolve`].
    /// Returns `None` when nothing applies.
    pub fn interpret_decompressed(&mut self, plain: &[u8], depth: u32) -> Option<Value> {
        let prefix = match cbor::decode_prefix(plain) {
            Ok((decoded, consumed)) if consumed == plain.len() => {
                return Some(self.resolve_at(decoded, depth + 1));
            }
            Ok((decoded, _)) => Some(decoded),
            Err(_) => None,
        };
        if let Ok(text) = std::str::from_utf8(plain) {
            let next = match serde_json::from_str::<serde_json::Value>(text) {
                Ok(json @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
                    Value::from_json(&json)
                }
                _ => Value::Text(text.to_owned()),
            };
            return Some(self.resolve_at(next, depth + 1));
        }
        prefix.map(|decoded| self.resolve_at(decoded, depth + 1))
    }

    /// Budget state after (or during) a pass.
    #[must_use]
    pub fn budget(&self) -> &RecoveryBudget {
        self.budget
    }

    #[must_use]
    pub fn decompress_limits(&self) -> DecompressLimits {
        self.decompress_limits
    }

    /// The sink this pass reports into, for callers that add their own
    /// diagnostics around a resolve.
    pub fn sink(&mut self) -> &mut dyn DiagnosticSink {
        &mut *self.sink
    }

    // -----------------------------------------------------------------------
    // Per-kind handlers
    // -----------------------------------------------------------------------

    fn resolve_text(&mut self, text: String, depth: u32) -> Value {
        if !is_hex_payload(&text) {
            return Value::Text(text);
        }
        match hex::decode(&text) {
            Ok(bytes) => self.resolve_bytes(&bytes, depth),
            Err(_) => Value::Text(text),
        }
    }

    fn resolve_bytes(&mut self, bytes: &[u8], depth: u32) -> Value {
        let mut prefix_only = None;
        for attempt in BYTE_ATTEMPTS {
            match attempt {
                ByteAttempt::Structured => match cbor::decode_prefix(bytes) {
                    Ok((decoded, consumed)) if consumed == bytes.len() => {
                        return self.resolve_at(decoded, depth + 1);
                    }
                    // Trailing bytes: keep as a last resort so a compressed
                    // stream whose header happens to parse still gets unpacked.
                    Ok((decoded, _)) => prefix_only = Some(decoded),
                    Err(_) => {}
                },
                ByteAttempt::Decompress(algorithm) => {
                    if let Some(resolved) = self.try_decompress(algorithm, bytes, depth) {
                        return resolved;
                    }
                }
            }
        }
        match prefix_only {
            Some(decoded) => self.resolve_at(decoded, depth + 1),
            None => Value::Text(hex::encode(bytes)),
        }
    }

    fn try_decompress(
        &mut self,
        algorithm: CompressionAlgorithm,
        bytes: &[u8],
        depth: u32,
    ) -> Option<Value> {
        let plain = decompress(bytes, algorithm, &self.decompress_limits).ok()?;
        self.sink.debug(
            STAGE,
            format!(
                "{algorithm} stream at depth {depth}: {} -> {} bytes",
                bytes.len(),
                plain.len()
            ),
        );
        // The first decompression that succeeds owns the node.
        Some(
            self.interpret_decompressed(&plain, depth)
                .unwrap_or_else(|| Value::Text(hex::encode(bytes))),
        )
    }

    fn resolve_map(&mut self, entries: Vec<(Value, Value)>, depth: u32) -> Value {
        let mut out = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = match key {
                Value::Bytes(_) | Value::Text(_) => self.resolve_at(key, depth + 1),
                other => other,
            };
            let value = self.resolve_at(value, depth + 1);
            map_insert(&mut out, key, value);
        }
        Value::Map(out)
    }
}

/// Resolve `value` with a fresh budget built from `limits`.
pub fn resolve(value: Value, limits: &RecoveryLimits, sink: &mut dyn DiagnosticSink) -> Value {
    let mut budget = RecoveryBudget::new(limits);
    RecursiveResolver::new(&mut budget, limits.decompress, sink).resolve(value)
}
