//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, page sizes, validator thresholds)
//! - Check addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EngineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{EngineConfig, StorageBackend};

/// One rejected setting.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are both required",
            ));
        }
    }

    if config.storage.backend == StorageBackend::Journal
        && config.storage.journal_path.as_os_str().is_empty()
    {
        errors.push(ValidationError::new(
            "storage.journal_path",
            "required for the journal backend",
        ));
    }

    if config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must not be empty"));
    }
    if config.admin.default_page_size == 0 {
        errors.push(ValidationError::new("admin.default_page_size", "must be > 0"));
    }
    if config.admin.max_page_size < config.admin.default_page_size {
        errors.push(ValidationError::new(
            "admin.max_page_size",
            "must be >= admin.default_page_size",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "`{}` is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    let rules = &config.validators;
    let contrast = &rules.contrast;
    for (field, value) in [
        ("validators.contrast.aa_normal", contrast.aa_normal),
        ("validators.contrast.aa_large", contrast.aa_large),
        ("validators.contrast.aaa_normal", contrast.aaa_normal),
        ("validators.contrast.aaa_large", contrast.aaa_large),
    ] {
        if !(1.0..=21.0).contains(&value) {
            errors.push(ValidationError::new(field, "contrast ratios lie in 1..=21"));
        }
    }
    if contrast.aaa_normal < contrast.aa_normal {
        errors.push(ValidationError::new(
            "validators.contrast.aaa_normal",
            "must be >= aa_normal",
        ));
    }
    if contrast.aaa_large < contrast.aa_large {
        errors.push(ValidationError::new(
            "validators.contrast.aaa_large",
            "must be >= aa_large",
        ));
    }

    if rules.footer.min_columns > rules.footer.max_columns {
        errors.push(ValidationError::new(
            "validators.footer.min_columns",
            "must be <= max_columns",
        ));
    }
    for (field, value) in [
        ("validators.footer.max_columns", rules.footer.max_columns as u64),
        ("validators.showcase.max_rows", rules.showcase.max_rows),
        ("validators.showcase.max_columns", rules.showcase.max_columns),
        ("validators.home_category.max_columns", rules.home_category.max_columns),
        ("validators.nav_menu.max_depth", rules.nav_menu.max_depth as u64),
        ("validators.nav_menu.max_items", rules.nav_menu.max_items as u64),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
