//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the config engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Where versions are kept.
    pub storage: StorageConfig,

    pub admin: AdminConfig,

    /// Current-config lookup policy.
    pub resolver: ResolverConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Thresholds for the built-in publish validators.
    pub validators: ValidatorRules,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Lost on restart. Tests and local previews only.
    Memory,
    /// Append-only journal file.
    #[default]
    Journal,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Journal file, created with its parent directories if missing.
    pub journal_path: PathBuf,

    /// Sync every journal record to disk before acknowledging it.
    pub fsync: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Journal,
            journal_path: PathBuf::from("data/config-journal.jsonl"),
            fsync: true,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Page size when a listing request names none.
    pub default_page_size: usize,

    /// Upper clamp for requested page sizes.
    pub max_page_size: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Serve the global version for a qualified scope that has nothing
    /// published of its own.
    pub fallback_to_global: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Rules for every built-in validator.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ValidatorRules {
    pub contrast: ContrastRules,
    pub footer: FooterRules,
    pub showcase: ShowcaseRules,
    pub home_category: HomeCategoryRules,
    pub nav_menu: NavMenuRules,
}

/// WCAG contrast thresholds. Falling below AA blocks a publish, falling
/// below AAA only warns.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ContrastRules {
    pub aa_normal: f64,
    pub aa_large: f64,
    pub aaa_normal: f64,
    pub aaa_large: f64,
}

impl Default for ContrastRules {
    fn default() -> Self {
        Self {
            aa_normal: 4.5,
            aa_large: 3.0,
            aaa_normal: 7.0,
            aaa_large: 4.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FooterRules {
    pub min_columns: usize,
    pub max_columns: usize,
    pub max_links_per_column: usize,
}

impl Default for FooterRules {
    fn default() -> Self {
        Self {
            min_columns: 1,
            max_columns: 6,
            max_links_per_column: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShowcaseRules {
    pub max_rows: u64,
    pub max_columns: u64,
}

impl Default for ShowcaseRules {
    fn default() -> Self {
        Self {
            max_rows: 10,
            max_columns: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HomeCategoryRules {
    pub max_categories: usize,
    pub max_columns: u64,
}

impl Default for HomeCategoryRules {
    fn default() -> Self {
        Self {
            max_categories: 24,
            max_columns: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NavMenuRules {
    pub max_depth: usize,
    pub max_items: usize,
}

impl Default for NavMenuRules {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_items: 200,
        }
    }
}
