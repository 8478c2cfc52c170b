//! Entry store: durable storage of spreadsheet entries.
//!
//! [`EntryStore`] is the single handle the rest of the service talks to. It
//! dispatches to either the PostgreSQL backend (`sqlx::PgPool`) or the
//! in-memory backend used by tests and by deployments that run with
//! `PERSISTENCE_ENABLED=false`.

pub mod memory;
pub mod models;
pub mod postgres;

use chrono::{DateTime, Utc};

pub use memory::MemoryEntryStore;
pub use postgres::PostgresEntryStore;

use crate::domain::{Entry, EntryId, EntryStats, NewEntry};
use crate::error::AppError;

/// Storage backend for entries.
#[derive(Debug)]
pub enum EntryStore {
    /// Process-local map; contents are lost on restart.
    Memory(MemoryEntryStore),
    /// `excel_data` table in PostgreSQL.
    Postgres(PostgresEntryStore),
}

impl EntryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::Memory(MemoryEntryStore::new())
    }

    /// Assigns an id and timestamps, persists, and returns the stored entry.
    ///
    /// No cross-field validation is done: `record_count` is stored as given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn create(&self, new: NewEntry) -> Result<Entry, AppError> {
        match self {
            Self::Memory(store) => Ok(store.create(new).await),
            Self::Postgres(store) => store.create(new).await,
        }
    }

    /// Fetches one entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] for an unknown id.
    pub async fn get(&self, id: EntryId) -> Result<Entry, AppError> {
        match self {
            Self::Memory(store) => store.get(id).await,
            Self::Postgres(store) => store.get(id).await,
        }
    }

    /// Lists every entry ordered by creation time, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn list(&self) -> Result<Vec<Entry>, AppError> {
        match self {
            Self::Memory(store) => Ok(store.list().await),
            Self::Postgres(store) => store.list().await,
        }
    }

    /// Permanently deletes one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] for an unknown id.
    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Postgres(store) => store.delete(id).await,
        }
    }

    /// Dashboard counters as of the server clock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn stats(&self) -> Result<EntryStats, AppError> {
        self.stats_at(Utc::now()).await
    }

    /// Dashboard counters with `this_month` evaluated against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<EntryStats, AppError> {
        match self {
            Self::Memory(store) => Ok(store.stats_at(now).await),
            Self::Postgres(store) => store.stats_at(now).await,
        }
    }
}
