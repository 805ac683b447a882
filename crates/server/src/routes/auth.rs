//! Authentication route handlers.
//!
//! `POST /login` and `POST /register` return the token in the body and also
//! set it as the `jwt` cookie, next to a `user` cookie with the display name.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use pixel_spy_core::UserId;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::{TOKEN_COOKIE, USER_COOKIE};
use crate::services::AuthService;
use crate::services::auth::Session;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Public user profile.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Login/registration response body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// =============================================================================
// Handlers
// =============================================================================

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response> {
    let session = AuthService::new(state.store(), state.jwt())
        .login(&req.email, &req.password)
        .await?;

    Ok(session_response(&state, StatusCode::OK, session))
}

/// Create an account and log in.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response> {
    let session = AuthService::new(state.store(), state.jwt())
        .register(&req.email, &req.name, &req.password)
        .await?;

    Ok(session_response(&state, StatusCode::CREATED, session))
}

fn session_response(state: &AppState, status: StatusCode, session: Session) -> Response {
    let max_age = state.jwt().ttl_secs();
    let token_cookie = format!(
        "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session.token
    );
    let user_cookie = format!(
        "{USER_COOKIE}={}; Path=/; SameSite=Lax; Max-Age={max_age}",
        urlencoding::encode(&session.user.name)
    );

    let body = AuthResponse {
        token: session.token,
        user: UserProfile {
            id: session.user.id,
            email: session.user.email.into_inner(),
            name: session.user.name,
        },
    };

    (
        status,
        AppendHeaders([(SET_COOKIE, token_cookie), (SET_COOKIE, user_cookie)]),
        Json(body),
    )
        .into_response()
}
