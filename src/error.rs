//! Service-level error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::{ScopeError, VersionId};
use crate::store::StoreError;
use crate::validators::ValidatorError;

/// Errors surfaced by [`crate::engine::ConfigEngine`].
///
/// A publish that fails validation is not an error; it comes back as an
/// unsuccessful `PublishResult`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("version {0} not found")]
    NotFound(VersionId),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Transient storage failure. Safe to retry.
    #[error("storage unavailable: {0}")]
    Storage(#[source] StoreError),

    /// Validator crash or broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::PayloadTooLarge(_) => "payload_too_large",
            EngineError::Storage(_) => "storage_error",
            EngineError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            EngineError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::ScopeMismatch { .. } => EngineError::InvalidRequest(err.to_string()),
            StoreError::Io(_) | StoreError::Encode(_) => EngineError::Storage(err),
            StoreError::Corrupt { .. } | StoreError::Invariant(_) => {
                EngineError::Internal(err.to_string())
            }
        }
    }
}

impl From<ScopeError> for EngineError {
    fn from(err: ScopeError) -> Self {
        EngineError::InvalidRequest(err.to_string())
    }
}

impl From<ValidatorError> for EngineError {
    fn from(err: ValidatorError) -> Self {
        EngineError::Internal(err.to_string())
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
