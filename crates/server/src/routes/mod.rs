//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                  - Service info
//! GET    /version           - Version and liveness
//! GET    /health            - Liveness check
//! GET    /health/ready      - Readiness check (store ping)
//!
//! # Auth
//! POST   /login             - Login, returns token + sets cookies
//! POST   /register          - Register, returns token + sets cookies
//!
//! # Pixel (public)
//! GET    /spy/pixel1?id=N   - Record a visit, return the image
//!
//! # Spies (requires auth)
//! POST   /spy/new           - Create a spy
//! GET    /spy/all           - List own spies
//! GET    /spy/{id}          - Get a spy
//! PUT    /spy/{id}          - Update an owned spy
//! DELETE /spy/{id}          - Delete an owned spy
//!
//! # Records (requires auth)
//! GET    /record/all        - Records of all own spies
//! GET    /record/spy/{id}   - Records of one spy
//! DELETE /record/{id}       - Delete a record of an owned spy
//! ```

pub mod auth;
pub mod info;
pub mod pixel;
pub mod records;
pub mod spies;

use std::str::FromStr;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    middleware::from_fn,
    routing::{delete, get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error format.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error format.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Parse a path or query ID, rejecting with `400`.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Create the spy routes router.
pub fn spy_routes() -> Router<AppState> {
    Router::new()
        .route("/pixel1", get(pixel::pixel))
        .route("/new", post(spies::create))
        .route("/all", get(spies::list))
        .route(
            "/{id}",
            get(spies::show).put(spies::update).delete(spies::delete),
        )
}

/// Create the record routes router.
pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(records::list))
        .route("/spy/{id}", get(records::list_for_spy))
        .route("/{id}", delete(records::delete))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info::root))
        .route("/version", get(info::version))
        .route("/health", get(info::health))
        .route("/health/ready", get(info::readiness))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .nest("/spy", spy_routes())
        .nest("/record", record_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().allowed_origins);

    routes()
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
