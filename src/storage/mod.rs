//! Plan persistence.
//!
//! The store is a collaborator behind the [`PlanStore`] trait: insert a
//! finished record, list everything, delete by id. Records are never updated
//! in place.

pub mod sqlite_store;

pub use sqlite_store::SqlitePlanStore;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::plan::{PlanId, PlanRecord};

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Record (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Plan record store.
pub trait PlanStore: Send + Sync {
    /// Insert a finished plan record.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn insert(&self, record: &PlanRecord) -> StoreFuture<'_, StoreResult<()>>;

    /// List every persisted record, oldest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_all(&self) -> StoreFuture<'_, StoreResult<Vec<PlanRecord>>>;

    /// Delete a record by id. Deleting an absent id is not an error.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn delete_by_id(&self, id: PlanId) -> StoreFuture<'_, StoreResult<()>>;
}
