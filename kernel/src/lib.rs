//! Metadecode Kernel: best-effort format recovery for opaque metadata blobs.
//!
//! # API Surface
//!
//! - [`value::cbor::decode`] -- structured-binary bytes into a [`value::model::Value`] tree
//! - [`compression::decompress`] -- Brotli / Zstd / raw stream decoding with an output cap
//! - [`recovery::resolver::RecursiveResolver`] -- repeatedly peel hex, structured
//!   encoding and compression off a `Value` under a shared step/depth budget
//! - [`value::render::to_json`] -- boundary rendering of a `Value` as JSON
//!
//! # Module Dependency Direction
//!
//! `value` ← `compression` ← `recovery`
//!
//! One-way only. `recovery` is the only module that swallows lower-level
//! errors; `value` and `compression` surface typed errors to their caller.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compression;
pub mod recovery;
pub mod value;
