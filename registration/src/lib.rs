//! Metadecode Registration: voting-metadata envelopes on top of the kernel.
//!
//! Interprets a decoded structured map as one of the known registration
//! schemas and normalizes it into a [`normalize::NormalizedMetadata`]
//! record.
//!
//! # Crate dependency graph
//!
//! ```text
//! metadecode_kernel  ←  metadecode_registration  ←  metadecode_harness
//! (value, recovery)     (classify, normalize)        (I/O, envelopes, CLI)
//! ```
//!
//! # Key types
//!
//! - [`envelope::EnvelopeKind`]: which schema a top-level map follows
//! - [`chunked::ChunkedPayload`]: a reassembled, decompressed sub-payload
//! - [`rbac::RbacParseResult`]: certificate and role data from an RBAC map
//! - [`address::AddressCodec`]: seam for key/address derivation
//! - [`normalize::MetadataNormalizer`]: per-schema field extraction

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod chunked;
pub mod envelope;
pub mod fields;
pub mod normalize;
pub mod purpose;
pub mod rbac;
