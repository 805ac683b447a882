//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! pixel-cli user create -e agent@example.com -n "Agent" -p 'long-password'
//! ```

use pixel_spy_core::Email;
use pixel_spy_server::config::{ConfigError, database_url_from_env};
use pixel_spy_server::db::{self, PgStore, RepositoryError, Store};
use pixel_spy_server::models::NewUser;
use pixel_spy_server::services::auth::{
    AuthError, hash_password, validate_name, validate_password,
};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Database URL could not be assembled.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Name or password rejected, or the password could not be hashed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Other repository failure.
    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Create a new user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, UserError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;
    let name = validate_name(name)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new(db::create_pool(&database_url).await?);

    tracing::info!("Creating user: {}", email);
    let user = store
        .create_user(NewUser {
            email: &email,
            name,
            password_hash: &password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => UserError::Repository(other),
        })?;

    Ok(user.id.as_i32())
}
