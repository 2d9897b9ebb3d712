//! Domain model for versioned site configuration.
//!
//! # Data Flow
//! ```text
//! admin payload (opaque JSON)
//!     → ConfigScope (which family / tenant it belongs to)
//!     → ConfigVersion (draft, numbered per scope)
//!     → ValidationReport (attached on every publish attempt)
//!     → status: draft → published → superseded → published (rollback)
//! ```
//!
//! # Design Decisions
//! - Payloads are never interpreted here; only validators look inside, and
//!   wire payloads keep their exact JSON text
//! - "Current" is the unique published version, not a stored pointer
//! - All types are plain serde values so the journal and the HTTP layer
//!   share one representation

pub mod payload;
pub mod report;
pub mod scope;
pub mod version;

pub use payload::Payload;
pub use report::{Severity, ValidationEntry, ValidationReport};
pub use scope::{ConfigScope, ScopeError};
pub use version::{ConfigVersion, VersionId, VersionStatus, VersionSummary};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
