//! Authentication extractor.
//!
//! Reads `Authorization: Bearer <token>`, falling back to the `jwt` cookie set
//! at login, and verifies it with the application's [`JwtManager`].
//!
//! [`JwtManager`]: crate::services::JwtManager

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

use pixel_spy_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Name of the cookie that carries the token.
pub const TOKEN_COOKIE: &str = "jwt";

/// Name of the cookie that carries the display name.
pub const USER_COOKIE: &str = "user";

/// Extractor that requires a valid bearer token.
///
/// Rejects with `401` before the handler runs when the token is missing or
/// invalid.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user_id): RequireAuth) -> String {
///     format!("Hello, user {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_value(parts, TOKEN_COOKIE))
            .ok_or_else(|| AppError::Unauthorized("missing token".to_string()))?;

        let user_id = state.jwt().verify(&token)?;
        set_sentry_user(&user_id);

        Ok(Self(user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            h.strip_prefix("Bearer ")
                .or_else(|| h.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/spy/all");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        let p = parts(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&p).as_deref(), Some("abc.def.ghi"));

        assert!(bearer_token(&parts(&[("authorization", "Basic xyz")])).is_none());
        assert!(bearer_token(&parts(&[("authorization", "Bearer ")])).is_none());
        assert!(bearer_token(&parts(&[])).is_none());
    }

    #[test]
    fn test_cookie_value() {
        let p = parts(&[("cookie", "user=Agent; jwt=abc.def.ghi")]);
        assert_eq!(cookie_value(&p, TOKEN_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&p, USER_COOKIE).as_deref(), Some("Agent"));
        assert!(cookie_value(&p, "missing").is_none());
    }
}
