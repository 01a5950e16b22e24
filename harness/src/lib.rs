//! Metadecode Harness: the I/O boundary around the decoders.
//!
//! The harness reads input, picks a decode path, and packages the result
//! as a JSON report. It does NOT implement recovery or normalization; it
//! delegates to the kernel and registration crates.
//!
//! # Decode paths
//!
//! ```text
//! document:  input → cose::unwrap ─┬─ envelope → Brotli payload → document payload handler
//!                                  └─ none     → structured decode → document payload handler
//!                                                 └─ failure → hex preview + payload_error
//! metadata:  input → JSON or structured decode → MetadataNormalizer
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod cose;
pub mod document;
pub mod input;
pub mod metadata;
pub mod report;
pub mod run;
