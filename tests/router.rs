//! In-process router tests: middleware stack and auth, no sockets.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use site_config_engine::{ConfigEngine, HttpServer};

mod common;

fn router_with(config: site_config_engine::EngineConfig) -> Router {
    let engine = ConfigEngine::from_config(&config).unwrap();
    HttpServer::new(config, engine).router()
}

fn router() -> Router {
    router_with(common::test_config())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn admin(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", common::API_KEY))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-actor", "router-test")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_health_carries_request_id_and_nosniff() {
    let response = router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_incoming_request_id_is_propagated() {
    let response = router()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_admin_routes_require_key() {
    let response = router()
        .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");

    let response = router()
        .oneshot(
            Request::get("/admin/status")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_reports_storage_and_validators() {
    let response = router()
        .oneshot(admin("GET", "/admin/status", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "operational");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["scopes"], 0);
    assert_eq!(body["validators"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_save_draft_and_publish_statuses() {
    let app = router();

    let body = json!({"payload": {"rows": 50, "columns": 2}}).to_string();
    let response = app
        .clone()
        .oneshot(admin("POST", "/api/v1/scopes/showcase_layout/versions?qualifier=FR", Body::from(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let version = body_json(response).await;
    assert_eq!(version["created_by"], "router-test");
    assert_eq!(version["scope"]["qualifier"], "FR");
    let id = version["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(admin("POST", &format!("/api/v1/versions/{id}/publish"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["report"]["entries"][0]["code"], "out_of_range");
}

#[tokio::test]
async fn test_malformed_requests_are_json_400s() {
    let app = router();

    let response = app
        .clone()
        .oneshot(admin("POST", "/api/v1/scopes/theme/versions", Body::from("{not json")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_request");

    let response = app
        .clone()
        .oneshot(admin("GET", "/api/v1/scopes/theme/versions?cursor=abc", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(admin("GET", "/api/v1/scopes/theme/current?qualifier=a%20b", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = common::test_config();
    config.security.max_body_size = 64;
    let app = router_with(config);

    let big = json!({"payload": {"blob": "x".repeat(1024)}}).to_string();

    // Declared length over the limit is refused up front.
    let mut request = admin("POST", "/api/v1/scopes/theme/versions", Body::from(big.clone()));
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, big.len().into());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "payload_too_large");
    assert!(body["message"].as_str().unwrap().contains("byte limit"));

    // Without a length the body is cut off while buffering.
    let response = app
        .oneshot(admin("POST", "/api/v1/scopes/theme/versions", Body::from(big)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "payload_too_large");
    assert!(body["message"].is_string());
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_payload_text_served_verbatim() {
    let app = router();
    let payload = r#"{"zeta":1,"dealer_id":123456789012345678901234567890,"price":19.90,"alpha":{"b":1,"a":2}}"#;
    let body = format!(r#"{{"payload":{payload}}}"#);

    let response = app
        .clone()
        .oneshot(admin(
            "POST",
            "/api/v1/scopes/dealer_profile/versions?qualifier=DE",
            Body::from(body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let text = body_text(response).await;
    assert!(text.contains(payload), "{text}");
    let id = serde_json::from_str::<Value>(&text).unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(admin("GET", &format!("/api/v1/versions/{id}"), Body::empty()))
        .await
        .unwrap();
    assert!(body_text(response).await.contains(payload));

    let response = app
        .clone()
        .oneshot(admin("POST", &format!("/api/v1/versions/{id}/publish"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/api/v1/scopes/dealer_profile/current?qualifier=DE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(payload));
}
