//! Version storage subsystem.
//!
//! # Data Flow
//! ```text
//! create_draft ─┐
//!               ├→ scope write lock → journal append (write-ahead) → ledger arena
//! mark_published┘                                    → published cache swap
//!
//! get_version / list_versions → scope read lock → ledger arena
//! published                   → lock-free cache (ArcSwapOption)
//! ```
//!
//! # Design Decisions
//! - One ledger per scope in a DashMap; scopes never contend with each other
//! - Versions form an append-only arena; "published" is a status, and the
//!   published index/cache are derived and updated in the same critical
//!   section as the statuses
//! - The journal is written before memory is touched, so a failed append
//!   leaves no trace besides a burned version number
//! - Store operations are synchronous and short; callers in async code move
//!   them to the blocking pool

pub mod journal;
pub mod ledger;

pub use journal::{DraftRecord, Journal, JournalEvent};
pub use ledger::LedgerStore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::model::{ConfigScope, ConfigVersion, Payload, ValidationReport, VersionId, VersionSummary};

/// Errors raised by version stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No version with this id exists.
    #[error("version {0} not found")]
    NotFound(VersionId),

    /// The version exists but belongs to another scope.
    #[error("version {version_id} does not belong to scope {scope}")]
    ScopeMismatch {
        version_id: VersionId,
        scope: ConfigScope,
    },

    /// Journal read/write failed. Transient; safe to retry.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode journal record: {0}")]
    Encode(#[from] serde_json::Error),

    /// A journal record in the middle of the file could not be replayed.
    #[error("journal corrupt at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// The one-published-per-scope invariant (or a lock) is broken.
    #[error("ledger invariant violated: {0}")]
    Invariant(String),
}

impl StoreError {
    /// Whether a caller may retry the same operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A pagination request over a scope's versions, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Only versions with `version_number < cursor` are returned.
    pub cursor: Option<u64>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { cursor: None, limit }
    }
}

/// One page of versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPage<T = ConfigVersion> {
    pub versions: Vec<T>,
    /// Cursor for the next page; `None` on the last page.
    pub next_cursor: Option<u64>,
}

impl VersionPage<ConfigVersion> {
    pub fn summaries(&self) -> VersionPage<VersionSummary> {
        VersionPage {
            versions: self.versions.iter().map(ConfigVersion::summary).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Per-scope overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSummary {
    pub scope: ConfigScope,
    pub version_count: usize,
    pub latest_version_number: Option<u64>,
    pub published_version_number: Option<u64>,
}

/// Durable append-only ledger of configuration versions.
pub trait VersionStore: Send + Sync {
    /// Allocate the next version number for `scope` and persist a draft.
    fn create_draft(&self, scope: &ConfigScope, payload: Payload, actor: &str)
        -> StoreResult<ConfigVersion>;

    fn get_version(&self, id: VersionId) -> StoreResult<ConfigVersion>;

    /// Versions of `scope`, newest `version_number` first.
    fn list_versions(&self, scope: &ConfigScope, page: PageRequest)
        -> StoreResult<VersionPage>;

    /// Atomically demote the scope's published version (if any) and promote
    /// `id`. A no-op when `id` is already published.
    fn mark_published(&self, scope: &ConfigScope, id: VersionId, actor: &str)
        -> StoreResult<ConfigVersion>;

    /// Record the latest validation report on a version.
    fn attach_report(&self, id: VersionId, report: ValidationReport) -> StoreResult<ConfigVersion>;

    /// The scope's published version, read without taking the scope lock.
    fn published(&self, scope: &ConfigScope) -> StoreResult<Option<Arc<ConfigVersion>>>;

    fn list_scopes(&self) -> StoreResult<Vec<ScopeSummary>>;
}
