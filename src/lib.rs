//! # sheet-vault
//!
//! HTTP service that ingests spreadsheets (`.xlsx`, `.xls`, `.csv`, or text
//! pasted from a spreadsheet), stores their rows as JSON, and serves them
//! back to administrators as lists, statistics and re-encoded workbooks.
//! The store is snapshotted to local JSON files on a daily schedule.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/) ── AdminAccess (auth)
//!     │
//!     ├── EntryService (service/)
//!     │     ├── Ingestion Validator (ingest/)
//!     │     └── Tabular Codec (codec/)
//!     │
//!     ├── EntryStore (persistence/) ── PostgreSQL or in-memory
//!     │
//!     └── BackupManager + BackupScheduler (backup/) ── JSON files on disk
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod backup;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod persistence;
pub mod service;
