//! Request parameter parsing shared by the public and admin routes.

use axum::{
    body::Bytes,
    extract::rejection::{BytesRejection, QueryRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use crate::error::EngineError;
use crate::model::{ConfigScope, Payload, VersionId};

/// Header naming the acting admin.
pub const X_ACTOR: &str = "x-actor";

/// Actor recorded when `X-Actor` is absent.
pub const DEFAULT_ACTOR: &str = "admin";

/// Body of draft saves and payload dry runs.
#[derive(Debug, Deserialize)]
struct PayloadRequest {
    payload: Payload,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub qualifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub qualifier: Option<String>,
    pub cursor: Option<u64>,
    pub limit: Option<usize>,
}

/// `scope_type` from the path plus optional `?qualifier=`.
pub fn scope(scope_type: &str, qualifier: Option<&str>) -> Result<ConfigScope, EngineError> {
    let scope = match qualifier {
        Some(q) => ConfigScope::new(scope_type, q)?,
        None => ConfigScope::global(scope_type)?,
    };
    Ok(scope)
}

pub fn version_id(raw: &str) -> Result<VersionId, EngineError> {
    raw.parse()
        .map_err(|_| EngineError::InvalidRequest(format!("`{raw}` is not a version id")))
}

pub fn actor(headers: &HeaderMap) -> Result<String, EngineError> {
    match headers.get(X_ACTOR) {
        None => Ok(DEFAULT_ACTOR.to_string()),
        Some(value) => value
            .to_str()
            .map(|s| s.trim().to_string())
            .map_err(|_| EngineError::InvalidRequest("X-Actor must be visible ASCII".to_string())),
    }
}

pub fn query<T>(query: Result<axum::extract::Query<T>, QueryRejection>) -> Result<T, EngineError> {
    query
        .map(|q| q.0)
        .map_err(|e| EngineError::InvalidRequest(e.body_text()))
}

/// The `payload` of a `{"payload": ...}` body, JSON text untouched.
pub fn payload(body: Result<Bytes, BytesRejection>) -> Result<Payload, EngineError> {
    let bytes = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            EngineError::PayloadTooLarge(e.body_text())
        } else {
            EngineError::InvalidRequest(e.body_text())
        }
    })?;
    serde_json::from_slice::<PayloadRequest>(&bytes)
        .map(|request| request.payload)
        .map_err(|e| EngineError::InvalidRequest(format!("invalid request body: {e}")))
}

/// Run a synchronous engine call on the blocking pool.
pub async fn blocking<T, F>(f: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EngineError::Internal(format!("engine task failed: {e}")))?
}
