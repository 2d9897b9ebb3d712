//! Site configuration versioning and publication engine.

pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod net;
pub mod observability;
pub mod publish;
pub mod resolver;
pub mod store;
pub mod validators;

pub use config::schema::EngineConfig;
pub use engine::ConfigEngine;
pub use error::EngineError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
