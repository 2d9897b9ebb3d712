//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Replay journal → Start watcher/metrics → Listen
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Journal records are flushed as they are written, so shutdown has
//!   nothing to persist

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
