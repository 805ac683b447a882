//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Each error is classified into
//! an [`ErrorKind`], which picks the HTTP status. Server-side failures are
//! captured to Sentry and their details are replaced by a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::spies::SpyError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Failure classes exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Unauthenticated,
    Forbidden,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// HTTP status for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadInput => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Spy or record operation failed.
    #[error("Spy error: {0}")]
    Spy(#[from] SpyError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
            Self::BadRequest(_) => ErrorKind::BadInput,
            Self::Unauthorized(_) => ErrorKind::Unauthenticated,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidName { .. }
                | AuthError::WeakPassword(_)
                | AuthError::UserAlreadyExists => ErrorKind::BadInput,
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    ErrorKind::Unauthenticated
                }
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    ErrorKind::Internal
                }
            },
            Self::Spy(err) => match err {
                SpyError::InvalidName(_) | SpyError::InvalidColor(_) => ErrorKind::BadInput,
                SpyError::SpyNotFound(_)
                | SpyError::RecordNotFound(_)
                | SpyError::ParentSpyMissing(_) => ErrorKind::NotFound,
                SpyError::Forbidden { .. } => ErrorKind::Forbidden,
                SpyError::Repository(_) => ErrorKind::Internal,
            },
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            _ if self.kind() == ErrorKind::Internal => INTERNAL_MESSAGE.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Spy(err) => err.to_string(),
            Self::BadRequest(msg) | Self::Unauthorized(msg) | Self::Internal(msg) => msg.clone(),
            Self::Database(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        // Capture server errors to Sentry
        if kind == ErrorKind::Internal {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, ?kind, "Request rejected");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (kind.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pixel_spy_core::{HexColor, RecordId, SpyId};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_body(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unauthorized("missing token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: missing token");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_kinds() {
        let invalid_color = HexColor::parse("#ZZZZZZ").unwrap_err();
        assert_eq!(
            AppError::from(SpyError::InvalidColor(invalid_color)).kind(),
            ErrorKind::BadInput
        );
        assert_eq!(
            AppError::from(SpyError::Forbidden { action: "x" }).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            AppError::from(SpyError::SpyNotFound(SpyId::new(1))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(SpyError::ParentSpyMissing(RecordId::new(1))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(AuthError::UserAlreadyExists).kind(),
            ErrorKind::BadInput
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).kind(),
            ErrorKind::Unauthenticated
        );
        assert_eq!(
            AppError::from(SpyError::Repository(RepositoryError::NotFound)).kind(),
            ErrorKind::Internal
        );
    }

    #[tokio::test]
    async fn test_body_is_json_error() {
        let body = get_body(AppError::from(SpyError::SpyNotFound(SpyId::new(9)))).await;
        assert_eq!(body, json!({ "error": "spy with ID 9 not found" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::from(SpyError::Repository(RepositoryError::DataCorruption(
            "secret table detail".to_string(),
        )));
        let body = get_body(err).await;
        assert_eq!(body, json!({ "error": INTERNAL_MESSAGE }));
    }
}
