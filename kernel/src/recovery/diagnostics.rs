//! Injectable diagnostic sink.
//!
//! Decoders never log through global state. Every call that can degrade
//! (fallbacks, budget cutoffs, per-field failures) takes a
//! `&mut dyn DiagnosticSink` and reports there. The caller decides whether
//! events go to `tracing`, into a report, or nowhere.

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Warn,
    Error,
}

impl DiagnosticLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Pipeline stage that produced the event, e.g. `"resolver"` or
    /// `"normalize.payment_address"`.
    pub stage: &'static str,
    pub message: String,
}

impl Diagnostic {
    /// JSON form used when diagnostics are embedded in a report.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "level": self.level.label(),
            "stage": self.stage,
            "message": self.message,
        })
    }
}

/// Receiver of diagnostics.
pub trait DiagnosticSink {
    fn record(&mut self, diagnostic: Diagnostic);

    fn debug(&mut self, stage: &'static str, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Debug,
            stage,
            message,
        });
    }

    fn warn(&mut self, stage: &'static str, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Warn,
            stage,
            message,
        });
    }

    fn error(&mut self, stage: &'static str, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Error,
            stage,
            message,
        });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic in arrival order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics at or above `level`.
    pub fn at_least(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.level >= level)
    }

    /// True if any diagnostic from `stage` was recorded.
    #[must_use]
    pub fn has_stage(&self, stage: &str) -> bool {
        self.diagnostics.iter().any(|d| d.stage == stage)
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards diagnostics to the `tracing` subscriber of the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        let Diagnostic {
            level,
            stage,
            message,
        } = diagnostic;
        match level {
            DiagnosticLevel::Debug => tracing::debug!(stage, "{message}"),
            DiagnosticLevel::Warn => tracing::warn!(stage, "{message}"),
            DiagnosticLevel::Error => tracing::error!(stage, "{message}"),
        }
    }
}

/// Fans one diagnostic out to two sinks.
pub struct TeeSink<'a> {
    first: &'a mut dyn DiagnosticSink,
    second: &'a mut dyn DiagnosticSink,
}

impl<'a> TeeSink<'a> {
    pub fn new(first: &'a mut dyn DiagnosticSink, second: &'a mut dyn DiagnosticSink) -> Self {
        Self { first, second }
    }
}

impl DiagnosticSink for TeeSink<'_> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.first.record(diagnostic.clone());
        self.second.record(diagnostic);
    }
}
