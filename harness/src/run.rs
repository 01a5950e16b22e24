//! One decode, from raw input bytes to a finished report.
//!
//! The caller supplies its own sink (the CLI passes a `TracingSink`); every
//! diagnostic is also collected so warnings end up in the report.

use metadecode_kernel::recovery::diagnostics::{CollectingSink, DiagnosticSink, TeeSink};

use crate::config::ResolvedConfig;
use crate::document::decode_document;
use crate::input::{self, InputError};
use crate::metadata::{decode_metadata, MetadataError};
use crate::report::success_report;

/// What to decode the input as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Signed or plain document, recovered recursively.
    Document,
    /// Registration metadata, normalized.
    Metadata,
}

/// Failures that end a run with a top-level error report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Decode `raw` (as read, before hex detection) and build the report.
///
/// # Errors
///
/// [`RunError::Input`] for empty input; [`RunError::Metadata`] when
/// metadata cannot be read or holds no map. Document mode never fails on
/// content.
pub fn run(
    mode: Mode,
    raw: &[u8],
    config: &ResolvedConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<serde_json::Value, RunError> {
    let bytes = input::prepare(raw.to_vec())?;
    let mut collected = CollectingSink::new();
    let body = {
        let mut tee = TeeSink::new(sink, &mut collected);
        match mode {
            Mode::Document => decode_document(&bytes, &config.limits, &mut tee).to_json(),
            Mode::Metadata => decode_metadata(&bytes, config, &mut tee)?.to_json(),
        }
    };
    Ok(success_report(body, raw, config, &collected))
}
