//! Service information, health and middleware behavior.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};

use pixel_spy_integration_tests::{TEST_VERSION, TestApp};

#[tokio::test]
async fn test_root_info() {
    let app = TestApp::new();
    let response = app.get("/", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["version"], TEST_VERSION);
    assert_eq!(body["documentation"], "https://docs.example.com");
}

#[tokio::test]
async fn test_version() {
    let app = TestApp::new();
    let body = app.get("/version", None).await.json();
    assert_eq!(body["version"], TEST_VERSION);
    assert_eq!(body["isAlive"], true);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, b"ok");

    assert_eq!(app.get("/health/ready", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::new();

    let echoed = app
        .send(
            Method::GET,
            "/health",
            None,
            None,
            &[("x-request-id", "req-123")],
        )
        .await;
    assert_eq!(echoed.headers["x-request-id"], "req-123");

    let generated = app.get("/health", None).await;
    assert!(generated.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::OPTIONS,
            "/spy/all",
            None,
            None,
            &[
                ("origin", "https://app.example.com"),
                ("access-control-request-method", "GET"),
                ("access-control-request-headers", "authorization"),
            ],
        )
        .await;
    assert_eq!(
        response.headers["access-control-allow-origin"],
        "https://app.example.com"
    );
}
