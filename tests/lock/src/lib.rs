//! Cross-crate lock tests for the metadecode workspace.
//!
//! The tests live in `tests/`; this library only holds fixture builders
//! shared between them and the `decode_fixture` binary.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fixtures;
