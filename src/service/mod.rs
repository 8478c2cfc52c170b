//! Service layer: business logic orchestration.
//!
//! [`EntryService`] validates and decodes incoming spreadsheets, stores the
//! resulting rows, and re-encodes them for download.

pub mod entry_service;

pub use entry_service::{Download, EntryService, Submission, Upload};
