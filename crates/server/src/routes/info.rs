//! Service information and health endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RootInfo {
    pub message: &'static str,
    pub documentation: String,
    pub version: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    pub is_alive: bool,
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<RootInfo> {
    let config = state.config();
    Json(RootInfo {
        message: "Welcome to the Pixel Spy API",
        documentation: config.docs_url.clone().unwrap_or_default(),
        version: config.version.clone(),
        status: "OK",
    })
}

/// `GET /version`
pub async fn version(State(state): State<AppState>) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: state.config().version.clone(),
        is_alive: true,
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
