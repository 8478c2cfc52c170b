//! In-process entry store.
//!
//! [`MemoryEntryStore`] keeps every entry in a `HashMap` behind a single
//! [`tokio::sync::RwLock`]. Each operation holds the lock for its whole
//! duration, which gives the same one-statement atomicity the SQL backend
//! relies on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Entry, EntryId, EntryStats, NewEntry};
use crate::error::AppError;

#[derive(Debug, Default)]
struct State {
    entries: HashMap<EntryId, Slot>,
    next_seq: u64,
}

/// Entry plus its insertion sequence number, used to order entries whose
/// `created_at` timestamps collide.
#[derive(Debug)]
struct Slot {
    seq: u64,
    entry: Entry,
}

/// Entry store held entirely in memory.
///
/// # Concurrency
///
/// - Reads (`get`, `list`, `stats`) run concurrently.
/// - Writes (`create`, `delete`) are serialized.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    state: RwLock<State>,
}

impl MemoryEntryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entry stamped with the current time.
    pub async fn create(&self, new: NewEntry) -> Entry {
        self.create_at(new, Utc::now()).await
    }

    /// Inserts a new entry stamped with `created_at`.
    ///
    /// Useful for seeding a store with historical data.
    pub async fn create_at(&self, new: NewEntry, created_at: DateTime<Utc>) -> Entry {
        let entry = new.into_entry(created_at);
        let mut state = self.state.write().await;
        let seq = state.next_seq;
        state.next_seq = seq.saturating_add(1);
        state.entries.insert(
            entry.id,
            Slot {
                seq,
                entry: entry.clone(),
            },
        );
        entry
    }

    /// Returns a copy of the entry with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] if no entry has that id.
    pub async fn get(&self, id: EntryId) -> Result<Entry, AppError> {
        let state = self.state.read().await;
        state
            .entries
            .get(&id)
            .map(|slot| slot.entry.clone())
            .ok_or(AppError::EntryNotFound(id))
    }

    /// Returns every entry, most recent first. Entries created at the same
    /// instant are ordered by most recent insertion first.
    pub async fn list(&self) -> Vec<Entry> {
        let state = self.state.read().await;
        let mut slots: Vec<&Slot> = state.entries.values().collect();
        slots.sort_by(|a, b| {
            b.entry
                .created_at
                .cmp(&a.entry.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        slots.into_iter().map(|slot| slot.entry.clone()).collect()
    }

    /// Permanently removes an entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] if no entry has that id; the store
    /// is left untouched.
    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::EntryNotFound(id))
    }

    /// Computes the dashboard counters relative to `now`.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> EntryStats {
        let state = self.state.read().await;
        EntryStats::from_entries(state.entries.values().map(|slot| &slot.entry), now)
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}
