//! Configuration versions and their lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::model::payload::Payload;
use crate::model::report::ValidationReport;
use crate::model::scope::ConfigScope;

/// Opaque unique identifier of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(Uuid);

impl VersionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VersionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Created, never live.
    Draft,
    /// The single live version of its scope.
    Published,
    /// Was live, since replaced. Can be republished (rollback).
    Superseded,
}

/// A stored configuration version.
///
/// The payload is immutable; only `status`, the publish/supersede stamps and
/// `validation_report` change after creation, and only through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigVersion {
    pub id: VersionId,
    pub scope: ConfigScope,
    pub version_number: u64,
    pub payload: Payload,
    pub status: VersionStatus,
    /// Unix seconds.
    pub created_at: u64,
    pub created_by: String,
    #[serde(default)]
    pub published_at: Option<u64>,
    #[serde(default)]
    pub published_by: Option<String>,
    #[serde(default)]
    pub superseded_at: Option<u64>,
    #[serde(default)]
    pub validation_report: Option<ValidationReport>,
}

impl ConfigVersion {
    /// A fresh draft.
    pub fn draft(
        scope: ConfigScope,
        version_number: u64,
        payload: impl Into<Payload>,
        created_by: &str,
        created_at: u64,
    ) -> Self {
        Self {
            id: VersionId::new(),
            scope,
            version_number,
            payload: payload.into(),
            status: VersionStatus::Draft,
            created_at,
            created_by: created_by.to_string(),
            published_at: None,
            published_by: None,
            superseded_at: None,
            validation_report: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == VersionStatus::Published
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id,
            scope: self.scope.clone(),
            version_number: self.version_number,
            status: self.status,
            created_at: self.created_at,
            created_by: self.created_by.clone(),
            published_at: self.published_at,
            validation_passed: self.validation_report.as_ref().map(|r| r.pass),
        }
    }
}

/// Listing view of a version without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: VersionId,
    pub scope: ConfigScope,
    pub version_number: u64,
    pub status: VersionStatus,
    pub created_at: u64,
    pub created_by: String,
    pub published_at: Option<u64>,
    /// Outcome of the latest publish attempt, if any.
    pub validation_passed: Option<bool>,
}
