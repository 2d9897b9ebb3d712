//! Validate-then-promote coordinator.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use crate::error::EngineError;
use crate::model::{ConfigScope, ConfigVersion, ValidationReport, VersionId};
use crate::observability::metrics;
use crate::store::{StoreError, VersionStore};
use crate::validators::{ValidatorError, ValidatorRegistry};

/// Outcome of a publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    pub report: ValidationReport,
    /// The version as stored after the attempt.
    pub version: ConfigVersion,
}

/// Runs validators and promotes versions that pass.
#[derive(Clone)]
pub struct PublishCoordinator {
    store: Arc<dyn VersionStore>,
    validators: Arc<ArcSwap<ValidatorRegistry>>,
}

impl PublishCoordinator {
    pub fn new(store: Arc<dyn VersionStore>, validators: Arc<ArcSwap<ValidatorRegistry>>) -> Self {
        Self { store, validators }
    }

    /// Validate `id` and make it the published version of its scope.
    pub fn publish(&self, id: VersionId, actor: &str) -> Result<PublishResult, EngineError> {
        let start = Instant::now();
        let version = self
            .store
            .get_version(id)
            .map_err(|e| storage_failure("get_version", e))?;
        let scope_type = version.scope.scope_type().to_string();

        if version.is_published() {
            tracing::debug!(
                scope = %version.scope,
                version_id = %id,
                actor = %actor,
                "Version already published"
            );
            metrics::record_publish(&scope_type, "already_published", start);
            let report = version
                .validation_report
                .clone()
                .unwrap_or_else(ValidationReport::passed);
            return Ok(PublishResult {
                success: true,
                report,
                version,
            });
        }

        let payload = stored_payload(&version)?;
        let report = match self.run_validator(&version.scope, &payload) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    scope = %version.scope,
                    version_id = %id,
                    actor = %actor,
                    error = %e,
                    "Validator crashed, publish aborted"
                );
                metrics::record_publish(&scope_type, "error", start);
                return Err(e.into());
            }
        };

        let version = self
            .store
            .attach_report(id, report.clone())
            .map_err(|e| storage_failure("attach_report", e))?;

        if !report.pass {
            tracing::info!(
                scope = %version.scope,
                version_id = %id,
                version_number = version.version_number,
                actor = %actor,
                errors = report.errors().count(),
                outcome = "validation_failed",
                "Publish blocked by validation"
            );
            metrics::record_publish(&scope_type, "validation_failed", start);
            return Ok(PublishResult {
                success: false,
                report,
                version,
            });
        }

        let scope = version.scope.clone();
        let version = self
            .store
            .mark_published(&scope, id, actor)
            .map_err(|e| storage_failure("mark_published", e))?;

        tracing::info!(
            scope = %scope,
            version_id = %id,
            version_number = version.version_number,
            actor = %actor,
            warnings = report.warnings().count(),
            outcome = "published",
            "Version published"
        );
        metrics::record_publish(&scope_type, "published", start);

        Ok(PublishResult {
            success: true,
            report,
            version,
        })
    }

    /// Dry run against a stored version. Nothing is recorded.
    pub fn validate_version(&self, id: VersionId) -> Result<ValidationReport, EngineError> {
        let version = self
            .store
            .get_version(id)
            .map_err(|e| storage_failure("get_version", e))?;
        let payload = stored_payload(&version)?;
        self.run_validator(&version.scope, &payload)
            .map_err(EngineError::from)
    }

    /// Dry run against a payload that has not been saved.
    pub fn validate_payload(
        &self,
        scope: &ConfigScope,
        payload: &Value,
    ) -> Result<ValidationReport, EngineError> {
        self.run_validator(scope, payload).map_err(EngineError::from)
    }

    pub fn validators(&self) -> &Arc<ArcSwap<ValidatorRegistry>> {
        &self.validators
    }

    fn run_validator(
        &self,
        scope: &ConfigScope,
        payload: &Value,
    ) -> Result<ValidationReport, ValidatorError> {
        let registry = self.validators.load();
        registry.run(scope.scope_type(), payload).inspect_err(|e| {
            let validator = match e {
                ValidatorError::Failed { validator, .. }
                | ValidatorError::Panicked { validator, .. } => validator.as_str(),
            };
            metrics::record_validator_failure(validator);
        })
    }
}

fn stored_payload(version: &ConfigVersion) -> Result<Cow<'_, Value>, EngineError> {
    version.payload.to_value().map_err(|e| {
        tracing::error!(version_id = %version.id, error = %e, "Stored payload is unreadable");
        EngineError::Internal(format!("payload of version {} is unreadable: {e}", version.id))
    })
}

/// Log and count a store failure on its way out as an [`EngineError`].
pub(crate) fn storage_failure(op: &'static str, err: StoreError) -> EngineError {
    match &err {
        StoreError::NotFound(_) | StoreError::ScopeMismatch { .. } => {}
        StoreError::Io(_) | StoreError::Encode(_) => {
            tracing::warn!(op, error = %err, "Storage operation failed");
            metrics::record_storage_error(op);
        }
        StoreError::Corrupt { .. } | StoreError::Invariant(_) => {
            tracing::error!(op, error = %err, "Storage invariant violated");
            metrics::record_storage_error(op);
        }
    }
    EngineError::from(err)
}
