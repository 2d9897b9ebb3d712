//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_drafts_created_total` (counter): drafts saved, by scope type
//! - `config_publish_total` (counter): publish attempts by outcome
//!   (`published`, `already_published`, `validation_failed`, `error`)
//! - `config_publish_duration_seconds` (histogram): validate + commit latency
//! - `config_resolve_total` (counter): lookups by source
//! - `config_storage_errors_total` (counter): store failures by operation
//! - `config_validator_failures_total` (counter): validator crashes
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder (tests, metrics disabled) every call is a no-op
//! - The Prometheus exporter serves its own HTTP listener

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_draft_created(scope_type: &str) {
    ::metrics::counter!("config_drafts_created_total", "scope_type" => scope_type.to_string())
        .increment(1);
}

pub fn record_publish(scope_type: &str, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "config_publish_total",
        "scope_type" => scope_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("config_publish_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolve(source: &'static str) {
    ::metrics::counter!("config_resolve_total", "source" => source).increment(1);
}

pub fn record_storage_error(op: &'static str) {
    ::metrics::counter!("config_storage_errors_total", "op" => op).increment(1);
}

pub fn record_validator_failure(validator: &str) {
    ::metrics::counter!("config_validator_failures_total", "validator" => validator.to_string())
        .increment(1);
}
