//! `PostgreSQL`-backed [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pixel_spy_core::{Email, HexColor, RecordId, SpyId, SpyName, UserId};

use super::records::RecordRepository;
use super::spies::SpyRepository;
use super::users::UserRepository;
use super::{RepositoryError, Store};
use crate::models::{NewUser, Record, Spy, User};

/// Production store: a connection pool plus the per-table repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    const fn spies(&self) -> SpyRepository<'_> {
        SpyRepository::new(&self.pool)
    }

    const fn records(&self) -> RecordRepository<'_> {
        RecordRepository::new(&self.pool)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, RepositoryError> {
        self.users().create(user).await
    }

    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.users().get_with_password(email).await
    }

    async fn create_spy(
        &self,
        owner: UserId,
        name: &SpyName,
        color: &HexColor,
    ) -> Result<Spy, RepositoryError> {
        self.spies().create(owner, name, color).await
    }

    async fn get_spy(&self, id: SpyId) -> Result<Option<Spy>, RepositoryError> {
        self.spies().get_by_id(id).await
    }

    async fn list_spies_by_owner(&self, owner: UserId) -> Result<Vec<Spy>, RepositoryError> {
        self.spies().list_by_owner(owner).await
    }

    async fn update_spy(&self, spy: &Spy) -> Result<Spy, RepositoryError> {
        self.spies().update(spy).await
    }

    async fn delete_spy(&self, id: SpyId) -> Result<bool, RepositoryError> {
        self.spies().delete(id).await
    }

    async fn create_record(
        &self,
        spy_id: SpyId,
        ip: &str,
        time: DateTime<Utc>,
    ) -> Result<Record, RepositoryError> {
        self.records().create(spy_id, ip, time).await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        self.records().get_by_id(id).await
    }

    async fn list_records_by_spy(&self, spy_id: SpyId) -> Result<Vec<Record>, RepositoryError> {
        self.records().list_by_spy(spy_id).await
    }

    async fn list_records_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        self.records().list_by_owner(owner).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool, RepositoryError> {
        self.records().delete(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
