//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire. Entries and stats are returned as
//! their domain types directly.

pub mod backup_dto;
pub mod entry_dto;

pub use backup_dto::*;
pub use entry_dto::*;
