//! Wire types returned by the engine's HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub scope_type: String,
    /// Empty for the global scope.
    #[serde(default)]
    pub qualifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub code: String,
    /// `info`, `warning` or `error`.
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub pass: bool,
    #[serde(default)]
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn error_codes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.severity == "error")
            .map(|e| e.code.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub scope: Scope,
    pub version_number: u64,
    pub payload: Value,
    /// `draft`, `published` or `superseded`.
    pub status: String,
    pub created_at: u64,
    pub created_by: String,
    pub published_at: Option<u64>,
    pub published_by: Option<String>,
    pub superseded_at: Option<u64>,
    pub validation_report: Option<Report>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    pub scope: Scope,
    pub version_number: u64,
    pub status: String,
    pub created_at: u64,
    pub created_by: String,
    pub published_at: Option<u64>,
    pub validation_passed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPage {
    pub versions: Vec<VersionSummary>,
    pub next_cursor: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub report: Report,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub scope: Scope,
    /// `published`, `global_fallback` or `builtin_default`.
    pub source: String,
    pub version_id: Option<String>,
    pub version_number: Option<u64>,
    pub published_at: Option<u64>,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSummary {
    pub scope: Scope,
    pub version_count: usize,
    pub latest_version_number: Option<u64>,
    pub published_version_number: Option<u64>,
}
