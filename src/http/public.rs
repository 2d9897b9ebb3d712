//! Unauthenticated routes: current configuration and liveness.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::error::EngineError;
use crate::http::params::{self, ScopeQuery};
use crate::http::server::AppState;

pub fn setup_public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/scopes/{scope_type}/current", get(resolve_current))
}

async fn health() -> &'static str {
    "ok"
}

/// The live configuration for a scope, never an error once the scope parses.
async fn resolve_current(
    State(state): State<AppState>,
    Path(scope_type): Path<String>,
    query: Result<Query<ScopeQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, EngineError> {
    let query = params::query(query)?;
    let scope = params::scope(&scope_type, query.qualifier.as_deref())?;

    let resolved = state.engine.resolve_current(&scope);
    let etag = resolved.etag();
    let etag_value = HeaderValue::from_str(&etag)
        .map_err(|e| EngineError::Internal(format!("unencodable etag: {e}")))?;

    if if_none_match(&headers, &etag) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag_value)]).into_response());
    }

    Ok((
        [
            (header::ETAG, etag_value),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        Json(resolved),
    )
        .into_response())
}

/// Whether the client's `If-None-Match` already names `etag`.
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|tag| tag.trim().trim_start_matches("W/"))
        .any(|tag| tag == "*" || tag == etag)
}
