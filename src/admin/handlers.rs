use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::error::EngineError;
use crate::http::params::{self, ListQuery, ScopeQuery};
use crate::http::server::AppState;
use crate::model::{ConfigVersion, ValidationReport, VersionSummary};
use crate::publish::PublishResult;
use crate::store::{PageRequest, ScopeSummary, VersionPage};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub storage: &'static str,
    pub scopes: usize,
    pub published_scopes: usize,
    pub validators: Vec<String>,
    pub fallback_to_global: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Result<Json<SystemStatus>, EngineError> {
    let engine = state.engine.clone();
    let scopes = params::blocking(move || engine.list_scopes()).await?;

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        storage: if state.engine.is_durable() { "journal" } else { "memory" },
        scopes: scopes.len(),
        published_scopes: scopes
            .iter()
            .filter(|s| s.published_version_number.is_some())
            .count(),
        validators: state.engine.validator_types(),
        fallback_to_global: state.engine.fallback_to_global(),
    }))
}

pub async fn list_scopes(State(state): State<AppState>) -> Result<Json<Vec<ScopeSummary>>, EngineError> {
    let engine = state.engine.clone();
    let scopes = params::blocking(move || engine.list_scopes()).await?;
    Ok(Json(scopes))
}

pub async fn save_draft(
    State(state): State<AppState>,
    Path(scope_type): Path<String>,
    query: Result<Query<ScopeQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ConfigVersion>), EngineError> {
    let query = params::query(query)?;
    let scope = params::scope(&scope_type, query.qualifier.as_deref())?;
    let actor = params::actor(&headers)?;
    let payload = params::payload(body)?;

    let engine = state.engine.clone();
    let version = params::blocking(move || engine.save_draft(&scope, payload, &actor)).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(scope_type): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<VersionPage<VersionSummary>>, EngineError> {
    let query = params::query(query)?;
    let scope = params::scope(&scope_type, query.qualifier.as_deref())?;

    let limit = {
        let config = state.config.load();
        query
            .limit
            .unwrap_or(config.admin.default_page_size)
            .clamp(1, config.admin.max_page_size.max(1))
    };
    let page = PageRequest {
        cursor: query.cursor,
        limit,
    };

    let engine = state.engine.clone();
    let versions = params::blocking(move || engine.list_versions(&scope, page)).await?;
    Ok(Json(versions.summaries()))
}

pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConfigVersion>, EngineError> {
    let id = params::version_id(&id)?;
    let engine = state.engine.clone();
    let version = params::blocking(move || engine.get_version(id)).await?;
    Ok(Json(version))
}

/// 200 when published, 422 with the full report when validation blocks it.
pub async fn publish_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<PublishResult>), EngineError> {
    let id = params::version_id(&id)?;
    let actor = params::actor(&headers)?;

    let engine = state.engine.clone();
    let result = params::blocking(move || engine.publish(id, &actor)).await?;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(result)))
}

pub async fn validate_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ValidationReport>, EngineError> {
    let id = params::version_id(&id)?;
    let engine = state.engine.clone();
    let report = params::blocking(move || engine.validate_version(id)).await?;
    Ok(Json(report))
}

pub async fn validate_payload(
    State(state): State<AppState>,
    Path(scope_type): Path<String>,
    query: Result<Query<ScopeQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ValidationReport>, EngineError> {
    let query = params::query(query)?;
    let scope = params::scope(&scope_type, query.qualifier.as_deref())?;
    let payload = params::payload(body)?;

    let engine = state.engine.clone();
    let report = params::blocking(move || engine.validate_payload(&scope, &payload)).await?;
    Ok(Json(report))
}
