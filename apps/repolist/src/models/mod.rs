//! Shared data models for check reports and overlay records.

pub mod repo;

pub use repo::{RepoEntry, SourceRef};

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
/// Inclusive, 1-based range of source lines.
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single validation failure or warning anchored to a source range.
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    pub span: Span,
    pub title: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(file: &str, span: Span, title: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            file: file.to_string(),
            span,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(file: &str, span: Span, title: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(file, span, title, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// An owner email confirmed by the user directory.
pub struct Verified {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers and the exit code.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub entries: usize,
    pub additions: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of `repolist check`.
pub struct CheckReport {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
    pub verified: Vec<Verified>,
    pub summary: Summary,
}

impl CheckReport {
    /// False when any error diagnostic was emitted; warnings never fail a run.
    pub fn ok(&self) -> bool {
        self.summary.errors == 0
    }
}
