//! Domain layer: entry model, identity, and derived statistics.
//!
//! Everything here is storage-agnostic. The persistence layer stores
//! [`Entry`] values and the stats aggregator folds them into
//! [`EntryStats`].

pub mod entry;
pub mod entry_id;
pub mod stats;

pub use entry::{Entry, EntryStatus, Month, NewEntry, Row};
pub use entry_id::EntryId;
pub use stats::EntryStats;
