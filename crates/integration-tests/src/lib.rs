//! Integration tests for Pixel Spy.
//!
//! The full axum application is driven in-process with
//! `tower::ServiceExt::oneshot` on top of a `MemoryStore`, so no database or
//! network listener is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pixel-spy-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use pixel_spy_core::{Email, HexColor, RecordId, SpyId, SpyName, UserId};
use pixel_spy_server::config::{AllowedOrigins, JwtConfig, PixelConfig};
use pixel_spy_server::db::{MemoryStore, RepositoryError, Store};
use pixel_spy_server::models::{NewUser, Record, Spy, User};
use pixel_spy_server::{AppState, app};

/// Peer address attached to every request.
pub const PEER_IP: &str = "198.51.100.23";

/// Version string reported by the test application.
pub const TEST_VERSION: &str = "1.2.3-test";

/// Response captured from the application.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The `error` message of a JSON error body.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        serde_json::from_slice::<Value>(&self.body)
            .ok()?
            .get("error")?
            .as_str()
            .map(String::from)
    }
}

/// The application wired to an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh application with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_trust_proxy(false)
    }

    /// Build a fresh application, optionally trusting `X-Forwarded-For`.
    #[must_use]
    pub fn with_trust_proxy(trust_proxy: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(test_config(trust_proxy), store.clone());

        Self {
            router: app(state),
            store,
        }
    }

    /// Build an application whose record inserts always fail.
    ///
    /// Everything else is served by the in-memory store.
    #[must_use]
    pub fn with_failing_record_writes() -> Self {
        let store = Arc::new(MemoryStore::new());
        let failing = Arc::new(FailingRecordWrites {
            inner: store.clone(),
        });
        let state = AppState::new(test_config(false), failing);

        Self {
            router: app(state),
            store,
        }
    }

    /// Send a request and collect the full response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let mut request = builder.body(body).unwrap();
        let peer: SocketAddr = format!("{PEER_IP}:40000").parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None, &[]).await
    }

    /// `POST` a JSON body with an optional bearer token.
    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body), &[]).await
    }

    /// `PUT` a JSON body with a bearer token.
    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(token), Some(body), &[])
            .await
    }

    /// `DELETE` with a bearer token.
    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Some(token), None, &[]).await
    }

    /// Register a user and return their token.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    #[allow(clippy::unwrap_used)]
    pub async fn register(&self, email: &str, name: &str) -> String {
        let response = self
            .post(
                "/register",
                None,
                serde_json::json!({ "email": email, "name": name, "password": "correct-horse" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.error());
        response.json()["token"].as_str().unwrap().to_string()
    }

    /// Create a spy and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    #[allow(clippy::unwrap_used)]
    pub async fn create_spy(&self, token: &str, name: &str, color: &str) -> i64 {
        let response = self
            .post(
                "/spy/new",
                Some(token),
                serde_json::json!({ "name": name, "color": color }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.error());
        response.json()["spy_id"].as_i64().unwrap()
    }
}

/// Configuration used by every test application.
#[must_use]
pub fn test_config(trust_proxy: bool) -> PixelConfig {
    PixelConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused".to_string()),
        host: [127, 0, 0, 1].into(),
        port: 0,
        version: TEST_VERSION.to_string(),
        docs_url: Some("https://docs.example.com".to_string()),
        allowed_origins: AllowedOrigins::List(vec!["https://app.example.com".to_string()]),
        jwt: JwtConfig {
            secret: SecretString::from("k7#Qm2$vX9pL4nR8wT1yZ6bC3fH5jD0s".to_string()),
            ttl_hours: 1,
        },
        trust_proxy,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Store whose `create_record` fails with a database error that names
/// internal schema details.
struct FailingRecordWrites {
    inner: Arc<MemoryStore>,
}

/// Text carried by the injected database error.
pub const INJECTED_DB_ERROR: &str = "relation \"records\" is locked by pid 4711";

#[async_trait]
impl Store for FailingRecordWrites {
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, RepositoryError> {
        self.inner.create_user(user).await
    }

    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.inner.get_user_with_password(email).await
    }

    async fn create_spy(
        &self,
        owner: UserId,
        name: &SpyName,
        color: &HexColor,
    ) -> Result<Spy, RepositoryError> {
        self.inner.create_spy(owner, name, color).await
    }

    async fn get_spy(&self, id: SpyId) -> Result<Option<Spy>, RepositoryError> {
        self.inner.get_spy(id).await
    }

    async fn list_spies_by_owner(&self, owner: UserId) -> Result<Vec<Spy>, RepositoryError> {
        self.inner.list_spies_by_owner(owner).await
    }

    async fn update_spy(&self, spy: &Spy) -> Result<Spy, RepositoryError> {
        self.inner.update_spy(spy).await
    }

    async fn delete_spy(&self, id: SpyId) -> Result<bool, RepositoryError> {
        self.inner.delete_spy(id).await
    }

    async fn create_record(
        &self,
        _spy_id: SpyId,
        _ip: &str,
        _time: DateTime<Utc>,
    ) -> Result<Record, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::Protocol(
            INJECTED_DB_ERROR.to_string(),
        )))
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        self.inner.get_record(id).await
    }

    async fn list_records_by_spy(&self, spy_id: SpyId) -> Result<Vec<Record>, RepositoryError> {
        self.inner.list_records_by_spy(spy_id).await
    }

    async fn list_records_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        self.inner.list_records_by_owner(owner).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool, RepositoryError> {
        self.inner.delete_record(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}
