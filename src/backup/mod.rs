//! Backups: JSON snapshots of the entry store on local disk.
//!
//! [`BackupManager`] writes, lists and restores snapshots;
//! [`BackupScheduler`] drives it on a fixed interval (24 hours by default).

pub mod manager;
pub mod scheduler;
pub mod snapshot;

pub use manager::BackupManager;
pub use scheduler::BackupScheduler;
pub use snapshot::{Snapshot, SnapshotEntry, SnapshotMetadata};
