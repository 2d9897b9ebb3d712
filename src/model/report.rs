//! Validation reports produced by validators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    /// Blocks the publish.
    Error,
}

/// One diagnostic produced by a validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    /// Stable machine-readable rule code (e.g. `contrast_below_aa`).
    pub code: String,
    pub severity: Severity,
    /// Human-readable explanation shown in the admin UI.
    pub message: String,
    /// Which field / pair the finding is about.
    #[serde(default)]
    pub context: Value,
}

impl ValidationEntry {
    pub fn error(code: &str, message: impl Into<String>, context: Value) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>, context: Value) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            context,
        }
    }
}

/// Outcome of running a validator against a payload.
///
/// `pass` is true iff no entry has [`Severity::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    /// A passing report with no findings.
    pub fn passed() -> Self {
        Self {
            pass: true,
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<ValidationEntry>) -> Self {
        let pass = !entries.iter().any(|e| e.severity == Severity::Error);
        Self { pass, entries }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Warning)
    }
}
