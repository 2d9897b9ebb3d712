//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and HTTP layer produce:
//!     → logging.rs (structured log events, request ids from tower-http)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
