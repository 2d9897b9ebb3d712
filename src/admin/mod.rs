pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/api/v1/scopes", get(list_scopes))
        .route(
            "/api/v1/scopes/{scope_type}/versions",
            post(save_draft).get(list_versions),
        )
        .route("/api/v1/scopes/{scope_type}/validate", post(validate_payload))
        .route("/api/v1/versions/{id}", get(get_version))
        .route("/api/v1/versions/{id}/publish", post(publish_version))
        .route("/api/v1/versions/{id}/validate", post(validate_version))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
