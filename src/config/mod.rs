//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → shared via ArcSwap to the server and engine
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<EngineConfig>
//!     → validator rules, admin key, page sizes and resolver policy follow
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Listener and storage settings are read once at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AdminConfig, ContrastRules, EngineConfig, FooterRules, HomeCategoryRules, ListenerConfig,
    NavMenuRules, ResolverConfig, ShowcaseRules, StorageBackend, StorageConfig, TlsConfig,
    ValidatorRules,
};
