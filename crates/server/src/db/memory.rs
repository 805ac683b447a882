//! In-process [`Store`] used by tests and local demos.
//!
//! Mirrors the `PostgreSQL` semantics that the services rely on: unique
//! emails, foreign keys on insert, tombstoned deletes, and the spy/record
//! join for owner-scoped listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use pixel_spy_core::{Email, HexColor, RecordId, SpyId, SpyName, UserId};

use super::{RepositoryError, Store};
use crate::models::{NewUser, Record, Spy, User};

#[derive(Debug)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug)]
struct Row<T> {
    value: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T> Row<T> {
    const fn live(value: T) -> Self {
        Self {
            value,
            deleted_at: None,
        }
    }

    const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<StoredUser>,
    spies: Vec<Row<Spy>>,
    records: Vec<Row<Record>>,
    next_user_id: i32,
    next_spy_id: i32,
    next_record_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn spy_row(&self, id: SpyId) -> Option<&Row<Spy>> {
        self.spies.iter().find(|row| row.value.id == id)
    }
}

/// Store that keeps all rows in memory behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of record rows, tombstoned ones included.
    pub async fn record_count(&self) -> usize {
        self.tables.read().await.records.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| &u.user.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(Tables::next_id(&mut tables.next_user_id)),
            email: user.email.clone(),
            name: user.name.to_owned(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash.to_owned(),
        });

        Ok(created)
    }

    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| &u.user.email == email)
            .map(|u| (u.user.clone(), u.password_hash.clone())))
    }

    async fn create_spy(
        &self,
        owner: UserId,
        name: &SpyName,
        color: &HexColor,
    ) -> Result<Spy, RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.user.id == owner) {
            return Err(RepositoryError::Conflict("owner does not exist".to_owned()));
        }

        let now = Utc::now();
        let spy = Spy {
            id: SpyId::new(Tables::next_id(&mut tables.next_spy_id)),
            name: name.clone(),
            color: color.clone(),
            user_id: Some(owner),
            created_at: now,
            updated_at: now,
        };
        tables.spies.push(Row::live(spy.clone()));

        Ok(spy)
    }

    async fn get_spy(&self, id: SpyId) -> Result<Option<Spy>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .spy_row(id)
            .filter(|row| row.is_live())
            .map(|row| row.value.clone()))
    }

    async fn list_spies_by_owner(&self, owner: UserId) -> Result<Vec<Spy>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .spies
            .iter()
            .filter(|row| row.is_live() && row.value.user_id == Some(owner))
            .map(|row| row.value.clone())
            .collect())
    }

    async fn update_spy(&self, spy: &Spy) -> Result<Spy, RepositoryError> {
        let mut tables = self.tables.write().await;

        let row = tables
            .spies
            .iter_mut()
            .find(|row| row.value.id == spy.id && row.is_live())
            .ok_or(RepositoryError::NotFound)?;

        row.value.name = spy.name.clone();
        row.value.color = spy.color.clone();
        row.value.updated_at = Utc::now();

        Ok(row.value.clone())
    }

    async fn delete_spy(&self, id: SpyId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;

        match tables
            .spies
            .iter_mut()
            .find(|row| row.value.id == id && row.is_live())
        {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_record(
        &self,
        spy_id: SpyId,
        ip: &str,
        time: DateTime<Utc>,
    ) -> Result<Record, RepositoryError> {
        let mut tables = self.tables.write().await;

        // Foreign key: the row must exist, tombstoned or not.
        if tables.spy_row(spy_id).is_none() {
            return Err(RepositoryError::Conflict("spy does not exist".to_owned()));
        }

        let record = Record {
            id: RecordId::new(Tables::next_id(&mut tables.next_record_id)),
            ip: ip.to_owned(),
            time,
            spy_id: Some(spy_id),
            created_at: Utc::now(),
        };
        tables.records.push(Row::live(record.clone()));

        Ok(record)
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .find(|row| row.value.id == id && row.is_live())
            .map(|row| row.value.clone()))
    }

    async fn list_records_by_spy(&self, spy_id: SpyId) -> Result<Vec<Record>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .filter(|row| row.is_live() && row.value.spy_id == Some(spy_id))
            .map(|row| row.value.clone())
            .collect())
    }

    async fn list_records_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .filter(|row| row.is_live())
            .filter(|row| {
                row.value
                    .spy_id
                    .and_then(|spy_id| tables.spy_row(spy_id))
                    .is_some_and(|spy| spy.value.user_id == Some(owner))
            })
            .map(|row| row.value.clone())
            .collect())
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;

        match tables
            .records
            .iter_mut()
            .find(|row| row.value.id == id && row.is_live())
        {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, email: &str) -> User {
        let email = Email::parse(email).unwrap();
        store
            .create_user(NewUser {
                email: &email,
                name: "Agent",
                password_hash: "hash",
            })
            .await
            .unwrap()
    }

    async fn spy(store: &MemoryStore, owner: UserId) -> Spy {
        store
            .create_spy(
                owner,
                &SpyName::parse("fox").unwrap(),
                &HexColor::parse("#112233").unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        user(&store, "a@spy.dev").await;

        let email = Email::parse("A@spy.dev").unwrap();
        let err = store
            .create_user(NewUser {
                email: &email,
                name: "Other",
                password_hash: "hash",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_spy_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store
            .create_spy(
                UserId::new(99),
                &SpyName::parse("fox").unwrap(),
                &HexColor::parse("#fff").unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_tombstoned_spy_is_hidden_but_keeps_records() {
        let store = MemoryStore::new();
        let owner = user(&store, "a@spy.dev").await;
        let spy = spy(&store, owner.id).await;
        store
            .create_record(spy.id, "10.0.0.1", Utc::now())
            .await
            .unwrap();

        assert!(store.delete_spy(spy.id).await.unwrap());
        assert!(!store.delete_spy(spy.id).await.unwrap());
        assert!(store.get_spy(spy.id).await.unwrap().is_none());
        assert_eq!(store.list_records_by_spy(spy.id).await.unwrap().len(), 1);
        assert_eq!(store.list_records_by_owner(owner.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_requires_spy_row() {
        let store = MemoryStore::new();
        let err = store
            .create_record(SpyId::new(1), "10.0.0.1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_tombstoned_spy_is_not_found() {
        let store = MemoryStore::new();
        let owner = user(&store, "a@spy.dev").await;
        let spy = spy(&store, owner.id).await;
        store.delete_spy(spy.id).await.unwrap();

        let err = store.update_spy(&spy).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
