//! Recovery module: the bounded, best-effort decoding engine.
//!
//! [`resolver::RecursiveResolver`] walks a `Value` tree and keeps peeling
//! encodings until nothing more decodes. Work is capped by a
//! [`budget::RecoveryBudget`] shared across the whole call tree, and every
//! notable event is reported to an injected [`diagnostics::DiagnosticSink`].

pub mod budget;
pub mod diagnostics;
pub mod resolver;
