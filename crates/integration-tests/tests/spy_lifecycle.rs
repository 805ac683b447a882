//! End-to-end spy and record flows over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use serde_json::json;

use pixel_spy_integration_tests::{PEER_IP, TestApp};

// =============================================================================
// Full Scenario
// =============================================================================

#[tokio::test]
async fn test_fox_scenario() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;

    let spy_id = app.create_spy(&token, "fox", "#112233").await;

    let pixel = app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
    assert_eq!(pixel.status, StatusCode::OK);
    assert_eq!(pixel.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(pixel.headers[header::CACHE_CONTROL], "no-store");
    assert!(pixel.body.starts_with(b"\x89PNG"));

    let records = app
        .get(&format!("/record/spy/{spy_id}"), Some(&token))
        .await;
    assert_eq!(records.status, StatusCode::OK);
    let records = records.json();
    let records = records["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["ip"], PEER_IP);
    assert_eq!(records[0]["spy_id"], spy_id);

    let uri = format!("/spy/{spy_id}");
    let bob = app.register("bob@spy.dev", "Bob").await;
    let forbidden = app.put(&uri, &bob, json!({ "name": "x" })).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let renamed = app.put(&uri, &token, json!({ "name": "fox2" })).await;
    assert_eq!(renamed.status, StatusCode::NO_CONTENT);
    let spy = app.get(&uri, Some(&token)).await;
    assert_eq!(spy.status, StatusCode::OK);
    assert_eq!(spy.json()["name"], "fox2");

    let delete = app.delete(&format!("/spy/{spy_id}"), &token).await;
    assert_eq!(delete.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/spy/{spy_id}"), Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let kept = app
        .get(&format!("/record/spy/{spy_id}"), Some(&token))
        .await;
    assert_eq!(kept.status, StatusCode::OK);
    assert_eq!(kept.json()["records"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Spies
// =============================================================================

#[tokio::test]
async fn test_create_rejects_bad_color() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;

    let response = app
        .post(
            "/spy/new",
            Some(&token),
            json!({ "name": "fox", "color": "#ZZZZZZ" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().unwrap().contains("color"));

    let ok = app
        .post(
            "/spy/new",
            Some(&token),
            json!({ "name": "fox", "color": "#abc123" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_rejects_short_name_and_bad_body() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;

    let short = app
        .post(
            "/spy/new",
            Some(&token),
            json!({ "name": "ab", "color": "#fff" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let missing = app
        .post("/spy/new", Some(&token), json!({ "name": "fox" }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(missing.error().is_some());
}

#[tokio::test]
async fn test_list_only_own_spies() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;

    app.create_spy(&alice, "fox", "#112233").await;
    app.create_spy(&alice, "fox", "#112233").await;
    app.create_spy(&bob, "owl", "#445566").await;

    let listed = app.get("/spy/all", Some(&alice)).await.json();
    let spies = listed["spies"].as_array().unwrap();
    assert_eq!(spies.len(), 2);
    assert!(spies.iter().all(|s| s["name"] == "fox"));
}

#[tokio::test]
async fn test_update_requires_ownership() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;
    let spy_id = app.create_spy(&alice, "fox", "#112233").await;
    let uri = format!("/spy/{spy_id}");

    let forbidden = app.put(&uri, &bob, json!({ "name": "wolf" })).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let ok = app
        .put(&uri, &alice, json!({ "name": "wolf", "color": "#000" }))
        .await;
    assert_eq!(ok.status, StatusCode::NO_CONTENT);

    let spy = app.get(&uri, Some(&bob)).await;
    assert_eq!(spy.status, StatusCode::OK);
    assert_eq!(spy.json()["name"], "wolf");
    assert_eq!(spy.json()["color"], "#000");
}

#[tokio::test]
async fn test_update_checks_access_before_input() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;
    let spy_id = app.create_spy(&alice, "fox", "#112233").await;
    let uri = format!("/spy/{spy_id}");

    let forbidden = app.put(&uri, &bob, json!({ "color": "#ZZZZZZ" })).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let missing = app
        .put("/spy/999", &alice, json!({ "color": "#ZZZZZZ" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let invalid = app.put(&uri, &alice, json!({ "name": "x" })).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;
    let spy_id = app.create_spy(&alice, "fox", "#112233").await;
    let uri = format!("/spy/{spy_id}");

    assert_eq!(app.delete(&uri, &bob).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, &alice).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri, &alice).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = TestApp::new();
    let token = app.register("alice@spy.dev", "Alice").await;

    assert_eq!(
        app.get("/spy/999", Some(&token)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.put("/spy/999", &token, json!({ "name": "wolf" }))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete("/spy/999", &token).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/spy/abc", Some(&token)).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.delete("/record/abc", &token).await.status,
        StatusCode::BAD_REQUEST
    );
}

// =============================================================================
// Records
// =============================================================================

#[tokio::test]
async fn test_owner_records_do_not_leak() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;
    let fox = app.create_spy(&alice, "fox", "#112233").await;
    let owl = app.create_spy(&bob, "owl", "#445566").await;

    app.get(&format!("/spy/pixel1?id={fox}"), None).await;
    app.get(&format!("/spy/pixel1?id={owl}"), None).await;
    app.get(&format!("/spy/pixel1?id={owl}"), None).await;

    let alice_records = app.get("/record/all", Some(&alice)).await.json();
    let alice_records = alice_records["records"].as_array().unwrap();
    assert_eq!(alice_records.len(), 1);
    assert_eq!(alice_records[0]["spy_id"], fox);

    let bob_records = app.get("/record/all", Some(&bob)).await.json();
    let bob_records = bob_records["records"].as_array().unwrap();
    assert_eq!(bob_records.len(), 2);
    assert!(bob_records.iter().all(|r| r["spy_id"] == owl));
}

#[tokio::test]
async fn test_delete_record_rules() {
    let app = TestApp::new();
    let alice = app.register("alice@spy.dev", "Alice").await;
    let bob = app.register("bob@spy.dev", "Bob").await;
    let spy_id = app.create_spy(&alice, "fox", "#112233").await;

    app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
    app.get(&format!("/spy/pixel1?id={spy_id}"), None).await;
    let records = app.get("/record/all", Some(&alice)).await.json();
    let ids: Vec<i64> = records["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);

    let first = format!("/record/{}", ids[0]);
    assert_eq!(app.delete(&first, &bob).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&first, &alice).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&first, &alice).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.delete("/record/999", &alice).await.status,
        StatusCode::NOT_FOUND
    );

    // Records of a deleted spy can no longer be deleted.
    app.delete(&format!("/spy/{spy_id}"), &alice).await;
    let second = format!("/record/{}", ids[1]);
    assert_eq!(app.delete(&second, &alice).await.status, StatusCode::NOT_FOUND);
}
