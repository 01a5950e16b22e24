//! Value module: the universal in-memory tree, its structured-binary decoder,
//! hex text helpers, and JSON rendering.
//!
//! This is the foundational layer. No other kernel module is imported here.

pub mod cbor;
pub mod hex_text;
pub mod model;
pub mod render;
