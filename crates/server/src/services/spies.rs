//! Spy and visit record service.
//!
//! Every mutating call goes through [`authorize`], which compares the acting
//! user to the resource owner. Records have no owner column; their owner is
//! resolved through the parent spy.

use chrono::Utc;
use thiserror::Error;

use pixel_spy_core::{HexColor, HexColorError, RecordId, SpyId, SpyName, SpyNameError, UserId};

use crate::db::{RepositoryError, Store};
use crate::models::{Record, Spy, SpyChanges};

/// Errors that can occur during spy and record operations.
#[derive(Debug, Error)]
pub enum SpyError {
    /// Spy name out of bounds.
    #[error("invalid name: {0}")]
    InvalidName(#[from] SpyNameError),

    /// Color is not a `#RGB`/`#RRGGBB` token.
    #[error("invalid color: {0}")]
    InvalidColor(#[from] HexColorError),

    /// No live spy with this ID.
    #[error("spy with ID {0} not found")]
    SpyNotFound(SpyId),

    /// No live record with this ID.
    #[error("record with ID {0} not found")]
    RecordNotFound(RecordId),

    /// The record's parent spy is gone.
    #[error("spy not found for record ID {0}")]
    ParentSpyMissing(RecordId),

    /// Acting user does not own the resource.
    #[error("unauthorized to {action}")]
    Forbidden { action: &'static str },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A resource with an owning user.
pub trait Owned {
    /// The owning user, if any.
    fn owner(&self) -> Option<UserId>;
}

impl Owned for Spy {
    fn owner(&self) -> Option<UserId> {
        self.user_id
    }
}

/// Allow `actor` to perform `action` on `resource` only if they own it.
///
/// # Errors
///
/// Returns `SpyError::Forbidden` otherwise. Resources with no owner are
/// never authorized.
pub fn authorize(
    resource: &impl Owned,
    actor: UserId,
    action: &'static str,
) -> Result<(), SpyError> {
    if resource.owner() == Some(actor) {
        Ok(())
    } else {
        Err(SpyError::Forbidden { action })
    }
}

/// Spy and record service.
pub struct SpyService<'a> {
    store: &'a dyn Store,
}

impl<'a> SpyService<'a> {
    /// Create a new spy service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Spies
    // =========================================================================

    /// Create a spy owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::InvalidName` or `SpyError::InvalidColor` for bad input.
    pub async fn create_spy(
        &self,
        owner: UserId,
        name: &str,
        color: &str,
    ) -> Result<Spy, SpyError> {
        let name = SpyName::parse(name)?;
        let color = HexColor::parse(color)?;

        let spy = self.store.create_spy(owner, &name, &color).await?;
        tracing::info!(spy_id = %spy.id, user_id = %owner, "Spy created");

        Ok(spy)
    }

    /// List the live spies owned by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::Repository` if the query fails.
    pub async fn list_spies(&self, owner: UserId) -> Result<Vec<Spy>, SpyError> {
        Ok(self.store.list_spies_by_owner(owner).await?)
    }

    /// Get any live spy by ID.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::SpyNotFound` if the spy is absent or deleted.
    pub async fn get_spy(&self, id: SpyId) -> Result<Spy, SpyError> {
        self.store
            .get_spy(id)
            .await?
            .ok_or(SpyError::SpyNotFound(id))
    }

    /// Change a spy's name and/or color.
    ///
    /// Fields left as `None` are kept. Nothing is written when the request
    /// matches the stored values.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::SpyNotFound` if absent, `SpyError::Forbidden` if
    /// `actor` is not the owner, then `SpyError::InvalidName`/`InvalidColor`
    /// for bad input.
    pub async fn update_spy(
        &self,
        id: SpyId,
        actor: UserId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Spy, SpyError> {
        let mut spy = self.get_spy(id).await?;
        authorize(&spy, actor, "update this spy")?;

        let changes = SpyChanges {
            name: name.map(SpyName::parse).transpose()?,
            color: color.map(HexColor::parse).transpose()?,
        };

        if !spy.apply(changes) {
            return Ok(spy);
        }

        let updated = self.store.update_spy(&spy).await.map_err(|e| match e {
            RepositoryError::NotFound => SpyError::SpyNotFound(id),
            other => SpyError::Repository(other),
        })?;
        tracing::info!(spy_id = %id, user_id = %actor, "Spy updated");

        Ok(updated)
    }

    /// Delete a spy. Its records are kept.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::SpyNotFound` if absent, `SpyError::Forbidden` if
    /// `actor` is not the owner.
    pub async fn delete_spy(&self, id: SpyId, actor: UserId) -> Result<(), SpyError> {
        let spy = self.get_spy(id).await?;
        authorize(&spy, actor, "delete this spy")?;

        if !self.store.delete_spy(id).await? {
            return Err(SpyError::SpyNotFound(id));
        }
        tracing::info!(spy_id = %id, user_id = %actor, "Spy deleted");

        Ok(())
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Log one visit of the pixel belonging to `spy_id`.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::SpyNotFound` if the spy is absent or deleted.
    pub async fn record_visit(&self, spy_id: SpyId, ip: &str) -> Result<Record, SpyError> {
        self.get_spy(spy_id).await?;

        let record = self
            .store
            .create_record(spy_id, ip, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => SpyError::SpyNotFound(spy_id),
                other => SpyError::Repository(other),
            })?;
        tracing::info!(spy_id = %spy_id, record_id = %record.id, ip, "Pixel visit recorded");

        Ok(record)
    }

    /// List the live records of a spy, deleted spies included.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::Repository` if the query fails.
    pub async fn list_spy_records(&self, spy_id: SpyId) -> Result<Vec<Record>, SpyError> {
        Ok(self.store.list_records_by_spy(spy_id).await?)
    }

    /// List the live records of every spy `owner` has ever owned.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::Repository` if the query fails.
    pub async fn list_owner_records(&self, owner: UserId) -> Result<Vec<Record>, SpyError> {
        Ok(self.store.list_records_by_owner(owner).await?)
    }

    /// Delete a record owned (through its spy) by `actor`.
    ///
    /// # Errors
    ///
    /// Returns `SpyError::RecordNotFound` if absent,
    /// `SpyError::ParentSpyMissing` if its spy is absent or deleted,
    /// `SpyError::Forbidden` if `actor` does not own that spy.
    pub async fn delete_record(&self, id: RecordId, actor: UserId) -> Result<(), SpyError> {
        let record = self
            .store
            .get_record(id)
            .await?
            .ok_or(SpyError::RecordNotFound(id))?;

        let parent = self.parent_spy(&record).await?;
        authorize(&parent, actor, "delete this record")?;

        if !self.store.delete_record(id).await? {
            return Err(SpyError::RecordNotFound(id));
        }
        tracing::info!(record_id = %id, user_id = %actor, "Record deleted");

        Ok(())
    }

    async fn parent_spy(&self, record: &Record) -> Result<Spy, SpyError> {
        let Some(spy_id) = record.spy_id else {
            return Err(SpyError::ParentSpyMissing(record.id));
        };

        self.store
            .get_spy(spy_id)
            .await?
            .ok_or(SpyError::ParentSpyMissing(record.id))
    }
}
