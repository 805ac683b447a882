//! Tracking pixel endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};

use pixel_spy_integration_tests::{INJECTED_DB_ERROR, TestApp};

#[tokio::test]
async fn test_unknown_spy_records_nothing() {
    let app = TestApp::new();

    let response = app.get("/spy/pixel1?id=42", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.error().is_some());
    assert_eq!(app.store.record_count().await, 0);
}

#[tokio::test]
async fn test_missing_or_malformed_id() {
    let app = TestApp::new();

    assert_eq!(
        app.get("/spy/pixel1", None).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/spy/pixel1?id=", None).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/spy/pixel1?id=fox", None).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(app.store.record_count().await, 0);
}

#[tokio::test]
async fn test_every_fetch_is_recorded() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;
    let spy_id = app.create_spy(&token, "fox", "#112233").await;

    for _ in 0..3 {
        let response = app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
    assert_eq!(app.store.record_count().await, 3);
}

#[tokio::test]
async fn test_deleted_spy_pixel_is_not_found() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;
    let spy_id = app.create_spy(&token, "fox", "#112233").await;
    app.delete(&format!("/spy/{spy_id}"), &token).await;

    let response = app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.record_count().await, 0);
}

#[tokio::test]
async fn test_forwarded_for_when_trusted() {
    let app = TestApp::with_trust_proxy(true);
    let token = app.register("alice@spy.dev", "Alice").await;
    let spy_id = app.create_spy(&token, "fox", "#112233").await;

    app.send(
        Method::GET,
        &format!("/spy/pixel1?id={spy_id}"),
        None,
        None,
        &[("x-forwarded-for", "203.0.113.50, 10.0.0.1")],
    )
    .await;

    let records = app.get("/record/all", Some(&token)).await.json();
    assert_eq!(records["records"][0]["ip"], "203.0.113.50");
}

#[tokio::test]
async fn test_failed_record_write_is_internal_error() {
    let app = TestApp::with_failing_record_writes();
    let token = app.register("alice@spy.dev", "Alice").await;
    let spy_id = app.create_spy(&token, "fox", "#112233").await;

    let response = app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        serde_json::json!({ "error": "Internal server error" })
    );
    assert!(!response.body.starts_with(b"\x89PNG"));
    assert!(!String::from_utf8_lossy(&response.body).contains(INJECTED_DB_ERROR));
    assert_ne!(
        response.headers.get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(app.store.record_count().await, 0);
}

#[tokio::test]
async fn test_bad_query_string_is_json_error() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;
    let spy_id = app.create_spy(&token, "fox", "#112233").await;

    let response = app
        .get(&format!("/spy/pixel1?id={spy_id}&id={spy_id}"), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().is_some());
    assert_eq!(app.store.record_count().await, 0);
}
