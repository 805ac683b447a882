//! Spy repository for database operations.
//!
//! Deleted spies keep their row with `deleted_at` set, so the visit history
//! that points at them stays intact. Every read here filters tombstones.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pixel_spy_core::{HexColor, SpyId, SpyName, UserId};

use super::{RepositoryError, map_constraint_error};
use crate::models::Spy;

/// Internal row type for `PostgreSQL` spy queries.
#[derive(Debug, sqlx::FromRow)]
struct SpyRow {
    id: i32,
    name: String,
    color: String,
    user_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SpyRow> for Spy {
    type Error = RepositoryError;

    fn try_from(row: SpyRow) -> Result<Self, Self::Error> {
        let name = SpyName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid spy name in database: {e}"))
        })?;
        let color = HexColor::parse(&row.color).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid spy color in database: {e}"))
        })?;

        Ok(Self {
            id: SpyId::new(row.id),
            name,
            color,
            user_id: row.user_id.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for spy database operations.
pub struct SpyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SpyRepository<'a> {
    /// Create a new spy repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a spy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `owner` does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        name: &SpyName,
        color: &HexColor,
    ) -> Result<Spy, RepositoryError> {
        let row = sqlx::query_as::<_, SpyRow>(
            r"
            INSERT INTO spies (name, color, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, color, user_id, created_at, updated_at
            ",
        )
        .bind(name.as_str())
        .bind(color.as_str())
        .bind(owner)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "owner does not exist"))?;

        row.try_into()
    }

    /// Get a live spy by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: SpyId) -> Result<Option<Spy>, RepositoryError> {
        let row = sqlx::query_as::<_, SpyRow>(
            r"
            SELECT id, name, color, user_id, created_at, updated_at
            FROM spies
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Spy::try_from).transpose()
    }

    /// List live spies owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Spy>, RepositoryError> {
        let rows = sqlx::query_as::<_, SpyRow>(
            r"
            SELECT id, name, color, user_id, created_at, updated_at
            FROM spies
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Spy::try_from).collect()
    }

    /// Write name and color back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the spy is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, spy: &Spy) -> Result<Spy, RepositoryError> {
        let row = sqlx::query_as::<_, SpyRow>(
            r"
            UPDATE spies
            SET name = $2, color = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, color, user_id, created_at, updated_at
            ",
        )
        .bind(spy.id)
        .bind(spy.name.as_str())
        .bind(spy.color.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Tombstone a spy.
    ///
    /// # Returns
    ///
    /// Returns `true` if the spy was deleted, `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: SpyId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE spies
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
