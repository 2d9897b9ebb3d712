//! Rust client for the site configuration engine.

pub mod backoff;
pub mod client;
pub mod types;

pub use backoff::RetryPolicy;
pub use client::{ClientError, ConfigClient};
pub use types::*;
