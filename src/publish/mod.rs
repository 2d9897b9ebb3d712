//! Publication workflow.
//!
//! # Data Flow
//! ```text
//! publish(version_id, actor)
//!     → store.get_version            (NotFound → error)
//!     → already published?           → idempotent success
//!     → validators.run(scope_type)   (crash → Internal, nothing changes)
//!     → store.attach_report          (every attempt leaves its report)
//!     → pass?  store.mark_published  → PublishResult { success: true }
//!       fail?                        → PublishResult { success: false }
//! ```
//!
//! # Design Decisions
//! - Validators run outside every store lock
//! - Concurrent publishes in one scope are last-writer-wins; the store
//!   serializes the swap itself

pub mod coordinator;

pub use coordinator::{PublishCoordinator, PublishResult};
