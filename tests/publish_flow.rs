//! End-to-end publication flows over HTTP.

use serde_json::{json, Value};
use site_config_client::{ClientError, ConfigClient};

mod common;

fn theme(button_bg: &str, button_text: &str) -> Value {
    json!({
        "light": {
            "background": "#FFFFFF",
            "text": "#111827",
            "button_bg": button_bg,
            "button_text": button_text
        }
    })
}

#[tokio::test]
async fn test_theme_publication_scenario() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();

    let initial = client.resolve_current("theme", None).await.unwrap();
    assert_eq!(initial.source, "builtin_default");
    assert!(initial.version_id.is_none());

    let v1 = client
        .save_draft("theme", None, &theme("#FFFFFF", "#FAFAFA"))
        .await
        .unwrap();
    assert_eq!(v1.version_number, 1);
    assert_eq!(v1.status, "draft");
    assert_eq!(v1.created_by, "integration");

    let failed = client.publish(&v1.id).await.unwrap();
    assert!(!failed.success);
    assert!(failed.report.error_codes().contains(&"contrast_below_aa"));
    assert_eq!(failed.version.status, "draft");

    let v2 = client
        .save_draft("theme", None, &theme("#111111", "#FAFAFA"))
        .await
        .unwrap();
    assert_eq!(v2.version_number, 2);

    let published = client.publish(&v2.id).await.unwrap();
    assert!(published.success);
    assert_eq!(published.version.status, "published");

    let current = client.resolve_current("theme", None).await.unwrap();
    assert_eq!(current.source, "published");
    assert_eq!(current.version_number, Some(2));
    assert_eq!(current.payload, theme("#111111", "#FAFAFA"));

    let v1 = client.get_version(&v1.id).await.unwrap();
    assert_eq!(v1.status, "draft");
    assert_eq!(v1.validation_report.map(|r| r.pass), Some(false));

    server.stop().await;
}

#[tokio::test]
async fn test_rollback_and_listing() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();

    let mut ids = Vec::new();
    for label in ["Cars", "Bikes", "Vans"] {
        let version = client
            .save_draft("nav_menu", Some("DE"), &json!({"items": [{"label": label}]}))
            .await
            .unwrap();
        assert!(client.publish(&version.id).await.unwrap().success);
        ids.push(version.id);
    }

    // Roll back to the first version.
    let rolled_back = client.publish(&ids[0]).await.unwrap();
    assert!(rolled_back.success);
    assert_eq!(rolled_back.version.version_number, 1);

    let first_page = client
        .list_versions("nav_menu", Some("DE"), None, Some(2))
        .await
        .unwrap();
    let numbers: Vec<u64> = first_page.versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![3, 2]);
    assert!(first_page.versions.iter().all(|v| v.status == "superseded"));
    assert_eq!(first_page.next_cursor, Some(2));

    let second_page = client
        .list_versions("nav_menu", Some("DE"), first_page.next_cursor, Some(2))
        .await
        .unwrap();
    assert_eq!(second_page.versions.len(), 1);
    assert_eq!(second_page.versions[0].status, "published");
    assert_eq!(second_page.next_cursor, None);

    let current = client.resolve_current("nav_menu", Some("DE")).await.unwrap();
    assert_eq!(current.payload, json!({"items": [{"label": "Cars"}]}));

    // The global scope is untouched.
    let global = client.resolve_current("nav_menu", None).await.unwrap();
    assert_eq!(global.source, "builtin_default");

    let scopes = client.list_scopes().await.unwrap();
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0].version_count, 3);
    assert_eq!(scopes[0].published_version_number, Some(1));

    server.stop().await;
}

#[tokio::test]
async fn test_publish_twice_is_idempotent() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();

    let draft = client
        .save_draft("showcase_layout", None, &json!({"rows": 2, "columns": 3}))
        .await
        .unwrap();
    let first = client.publish(&draft.id).await.unwrap();
    let second = client.publish(&draft.id).await.unwrap();
    assert!(first.success && second.success);
    assert_eq!(first.version.published_at, second.version.published_at);

    server.stop().await;
}

#[tokio::test]
async fn test_dry_runs() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();

    let report = client
        .validate_payload("footer_layout", None, &json!({"columns": []}))
        .await
        .unwrap();
    assert!(!report.pass);
    assert_eq!(report.error_codes(), vec!["column_count_out_of_range"]);

    let draft = client
        .save_draft("footer_layout", None, &json!({"columns": [{"title": "Help"}]}))
        .await
        .unwrap();
    let report = client.validate_version(&draft.id).await.unwrap();
    assert!(report.pass);

    let stored = client.get_version(&draft.id).await.unwrap();
    assert!(stored.validation_report.is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_error_responses() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();

    match client.get_version("00000000-0000-4000-8000-000000000000").await {
        Err(ClientError::Api { status, kind, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(kind, "not_found");
        }
        other => panic!("expected 404, got {other:?}"),
    }

    match client.get_version("seven").await {
        Err(ClientError::Api { status, kind, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(kind, "invalid_request");
        }
        other => panic!("expected 400, got {other:?}"),
    }

    let err = client
        .save_draft("Theme Colors", None, &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let anonymous = ConfigClient::new(&server.url());
    let err = anonymous.list_scopes().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Resolution stays public.
    assert!(anonymous.resolve_current("theme", Some("FR")).await.is_ok());

    server.stop().await;
}

#[tokio::test]
async fn test_resolve_honours_if_none_match() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();
    let draft = client
        .save_draft("home_category_layout", None, &json!({"categories": [{"id": "suv"}]}))
        .await
        .unwrap();
    client.publish(&draft.id).await.unwrap();

    let http = common::http_client();
    let url = format!("{}/api/v1/scopes/home_category_layout/current", server.url());
    let res = http.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let etag = res.headers()["etag"].to_str().unwrap().to_string();
    assert_eq!(etag, format!("\"{}\"", draft.id));

    let res = http
        .get(&url)
        .header("if-none-match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 304);

    server.stop().await;
}

#[tokio::test]
async fn test_reload_enables_global_fallback() {
    let server = common::start_server(common::test_config()).await;
    let client = server.admin_client();
    let draft = client
        .save_draft("theme", None, &theme("#1E3A8A", "#FFFFFF"))
        .await
        .unwrap();
    client.publish(&draft.id).await.unwrap();

    let before = client.resolve_current("theme", Some("AT")).await.unwrap();
    assert_eq!(before.source, "builtin_default");

    let mut config = common::test_config();
    config.resolver.fallback_to_global = true;
    server.config_tx.send(config).unwrap();

    let mut after = before;
    for _ in 0..50 {
        after = client.resolve_current("theme", Some("AT")).await.unwrap();
        if after.source == "global_fallback" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(after.source, "global_fallback");
    assert_eq!(after.version_id.as_deref(), Some(draft.id.as_str()));

    server.stop().await;
}
