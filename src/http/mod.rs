//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, reload loop)
//!     → public.rs (current config, health) | admin (drafts, publish, listings)
//!     → params.rs (scope, actor, cursor parsing; blocking-pool dispatch)
//!     → ConfigEngine
//!     → JSON response / EngineError body
//! ```

pub mod params;
pub mod public;
pub mod server;

pub use server::{AppState, HttpServer};
