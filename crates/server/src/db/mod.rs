//! Data access for users, spies and visit records.
//!
//! # Tables
//!
//! - `users` - Registered accounts (email unique, argon2 password hash)
//! - `spies` - Tracked entities, tombstoned via `deleted_at`
//! - `records` - One row per pixel fetch, tombstoned via `deleted_at`
//!
//! Foreign keys use `ON DELETE SET NULL`: physically removing a user or spy
//! orphans its dependents instead of cascading.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/`. The server applies
//! them on startup; they can also be run explicitly:
//! ```bash
//! cargo run -p pixel-spy-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Services only see the [`Store`] trait. [`PgStore`] is the production
//! implementation; [`MemoryStore`] keeps everything in process and backs the
//! test suites.

pub mod memory;
pub mod postgres;
pub mod records;
pub mod spies;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pixel_spy_core::{Email, HexColor, RecordId, SpyId, SpyName, UserId};

use crate::models::{NewUser, Record, Spy, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, dangling foreign key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Data access capability handed to services.
///
/// Lookups return `Ok(None)` for missing or tombstoned rows; deciding whether
/// that is a `NotFound` is the caller's job. Every method is a single
/// statement, so each is atomic on its own.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, RepositoryError>;

    /// Fetch a user together with their password hash.
    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a spy owned by `owner`.
    async fn create_spy(
        &self,
        owner: UserId,
        name: &SpyName,
        color: &HexColor,
    ) -> Result<Spy, RepositoryError>;

    /// Fetch a live spy by ID.
    async fn get_spy(&self, id: SpyId) -> Result<Option<Spy>, RepositoryError>;

    /// All live spies owned by `owner`, oldest first.
    async fn list_spies_by_owner(&self, owner: UserId) -> Result<Vec<Spy>, RepositoryError>;

    /// Persist name and color of `spy`, returning the stored row.
    ///
    /// Fails with `RepositoryError::NotFound` if the spy is gone.
    async fn update_spy(&self, spy: &Spy) -> Result<Spy, RepositoryError>;

    /// Tombstone a spy. Returns `false` if it was already gone.
    async fn delete_spy(&self, id: SpyId) -> Result<bool, RepositoryError>;

    /// Insert a visit record.
    async fn create_record(
        &self,
        spy_id: SpyId,
        ip: &str,
        time: DateTime<Utc>,
    ) -> Result<Record, RepositoryError>;

    /// Fetch a live record by ID.
    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, RepositoryError>;

    /// All live records pointing at `spy_id`, whether or not the spy is live.
    async fn list_records_by_spy(&self, spy_id: SpyId) -> Result<Vec<Record>, RepositoryError>;

    /// All live records whose spy (live or tombstoned) belongs to `owner`.
    async fn list_records_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError>;

    /// Tombstone a record. Returns `false` if it was already gone.
    async fn delete_record(&self, id: RecordId) -> Result<bool, RepositoryError>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Map a unique or foreign key violation to `RepositoryError::Conflict`.
pub(crate) fn map_constraint_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails or the
/// recorded history diverges from the embedded files.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
