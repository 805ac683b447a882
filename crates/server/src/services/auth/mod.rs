//! Authentication service.
//!
//! Password registration and login. Successful calls return the user and a
//! freshly issued bearer token.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, JwtManager};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use pixel_spy_core::Email;

use crate::db::{RepositoryError, Store};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// A user together with the token issued for them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    jwt: &'a JwtManager,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, jwt: &'a JwtManager) -> Self {
        Self { store, jwt }
    }

    /// Register a new user with email, display name and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidName` if the name is empty or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(NewUser {
                email: &email,
                name,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .store
            .get_user_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    fn session(&self, user: User) -> Result<Session, AuthError> {
        let token = self.jwt.issue(user.id)?;
        Ok(Session { user, token })
    }
}

/// Trim a display name and check it is 1 to 100 characters long.
///
/// # Errors
///
/// Returns `AuthError::InvalidName` if the trimmed name is empty or too long.
pub fn validate_name(name: &str) -> Result<&str, AuthError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidName {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name)
}

/// Check a password meets the minimum length.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if it is shorter than 8 bytes.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn jwt() -> JwtManager {
        JwtManager::new(b"k7#Qm2$vX9pL4nR8wT1yZ6bC3fH5jD0s", 1)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let jwt = jwt();
        let auth = AuthService::new(&store, &jwt);

        let registered = auth
            .register("Agent@Spy.dev", "Agent", "hunter22!")
            .await
            .unwrap();
        assert_eq!(registered.user.email.as_str(), "agent@spy.dev");
        assert_eq!(jwt.verify(&registered.token).unwrap(), registered.user.id);

        let session = auth.login("agent@spy.dev", "hunter22!").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let jwt = jwt();
        let auth = AuthService::new(&store, &jwt);

        auth.register("a@spy.dev", "A", "password1").await.unwrap();
        let err = auth
            .register("a@spy.dev", "B", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = MemoryStore::new();
        let jwt = jwt();
        let auth = AuthService::new(&store, &jwt);

        assert!(matches!(
            auth.register("nope", "A", "password1").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("a@spy.dev", "  ", "password1").await,
            Err(AuthError::InvalidName { .. })
        ));
        assert!(matches!(
            auth.register("a@spy.dev", "A", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        let store = MemoryStore::new();
        let jwt = jwt();
        let auth = AuthService::new(&store, &jwt);
        auth.register("a@spy.dev", "A", "password1").await.unwrap();

        assert!(matches!(
            auth.login("a@spy.dev", "password2").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("b@spy.dev", "password1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("password1").unwrap();
        let b = hash_password("password1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("password1", &a).is_ok());
    }
}
