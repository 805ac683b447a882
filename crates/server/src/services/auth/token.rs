//! Bearer token issuance and verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use pixel_spy_core::UserId;

use super::AuthError;
use crate::config::JwtConfig;

const SECS_PER_HOUR: i64 = 3600;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as a decimal string.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Signs and verifies HS256 tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("keys", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl JwtManager {
    /// Create a manager from a raw secret and a lifetime in hours.
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs: ttl_hours.saturating_mul(SECS_PER_HOUR),
        }
    }

    /// Create a manager from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.expose_secret().as_bytes(), config.ttl_hours)
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = now_secs();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Token)
    }

    /// Verify a token and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, expired or
    /// badly signed token.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AuthError::InvalidToken
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"k7#Qm2$vX9pL4nR8wT1yZ6bC3fH5jD0s";

    #[test]
    fn test_issue_then_verify_returns_user() {
        let jwt = JwtManager::new(SECRET, 1);
        let token = jwt.issue(UserId::new(42)).unwrap();
        assert_eq!(jwt.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtManager::new(SECRET, 1).issue(UserId::new(1)).unwrap();
        let other = JwtManager::new(b"another-secret-another-secret-123", 1);
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtManager::new(SECRET, -2);
        let token = jwt.issue(UserId::new(1)).unwrap();
        assert!(matches!(jwt.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let jwt = JwtManager::new(SECRET, 1);
        assert!(matches!(jwt.verify("not.a.token"), Err(AuthError::InvalidToken)));
        assert!(matches!(jwt.verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let output = format!("{:?}", JwtManager::new(SECRET, 1));
        assert!(output.contains("REDACTED"));
        assert!(!output.contains("k7#Qm2"));
    }
}
