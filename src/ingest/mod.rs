//! Ingestion validator: size, type, and required-field checks on uploads.

pub mod validator;

pub use validator::{Rejection, UploadLimits, UploadMeta, validate};
