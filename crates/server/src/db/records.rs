//! Visit record repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pixel_spy_core::{RecordId, SpyId, UserId};

use super::{RepositoryError, map_constraint_error};
use crate::models::Record;

/// Internal row type for `PostgreSQL` record queries.
#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: i32,
    ip: String,
    time: DateTime<Utc>,
    spy_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Self {
            id: RecordId::new(row.id),
            ip: row.ip,
            time: row.time,
            spy_id: row.spy_id.map(SpyId::new),
            created_at: row.created_at,
        }
    }
}

/// Repository for visit record database operations.
pub struct RecordRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecordRepository<'a> {
    /// Create a new record repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a visit record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the spy row does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        spy_id: SpyId,
        ip: &str,
        time: DateTime<Utc>,
    ) -> Result<Record, RepositoryError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r"
            INSERT INTO records (ip, time, spy_id)
            VALUES ($1, $2, $3)
            RETURNING id, ip, time, spy_id, created_at
            ",
        )
        .bind(ip)
        .bind(time)
        .bind(spy_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "spy does not exist"))?;

        Ok(row.into())
    }

    /// Get a live record by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r"
            SELECT id, ip, time, spy_id, created_at
            FROM records
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Record::from))
    }

    /// List live records for a spy, whether or not the spy is tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_spy(&self, spy_id: SpyId) -> Result<Vec<Record>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r"
            SELECT id, ip, time, spy_id, created_at
            FROM records
            WHERE spy_id = $1 AND deleted_at IS NULL
            ORDER BY id ASC
            ",
        )
        .bind(spy_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    /// List live records of every spy a user owns.
    ///
    /// Ownership comes from the join; records never store an owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r"
            SELECT r.id, r.ip, r.time, r.spy_id, r.created_at
            FROM records r
            JOIN spies s ON s.id = r.spy_id
            WHERE s.user_id = $1 AND r.deleted_at IS NULL
            ORDER BY r.id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    /// Tombstone a record.
    ///
    /// # Returns
    ///
    /// Returns `true` if the record was deleted, `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: RecordId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE records
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
