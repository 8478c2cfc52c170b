//! Service error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type. Each variant maps to a specific
//! HTTP status code and a structured JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::codec::CodecError;
use crate::domain::EntryId;
use crate::ingest::Rejection;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1101,
///     "message": "file too large: 60000000 bytes exceeds the 52428800 byte limit"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`AppError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status               |
/// |-----------|-------------------|---------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request           |
/// | 2000–2999 | Not Found         | 404 Not Found             |
/// | 3000–3999 | Server            | 500 Internal Server Error |
/// | 401       | Auth              | 401 Unauthorized          |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or field validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Upload rejected by the ingestion validator.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Spreadsheet decode or encode failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Entry with the given ID was not found.
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Backup snapshot file does not exist.
    #[error("backup not found: {0}")]
    BackupNotFound(String),

    /// Caller failed the admin gate.
    #[error("unauthorized")]
    Unauthorized,

    /// Database failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Snapshot could not be written or read.
    #[error("backup io error: {0}")]
    BackupIo(String),

    /// Snapshot file is not a valid snapshot document.
    #[error("snapshot parse error: {0}")]
    SnapshotParse(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Rejected(Rejection::TooLarge { .. }) => 1101,
            Self::Rejected(Rejection::UnsupportedType { .. }) => 1102,
            Self::Rejected(Rejection::MissingField(_)) => 1103,
            Self::Rejected(Rejection::MissingFile) => 1104,
            Self::Codec(CodecError::EmptyWorkbook) => 1201,
            Self::Codec(CodecError::EmptyData) => 1202,
            Self::Codec(CodecError::Malformed(_)) => 1203,
            Self::Codec(CodecError::Encode(_)) => 3201,
            Self::EntryNotFound(_) => 2001,
            Self::BackupNotFound(_) => 2002,
            Self::Unauthorized => 401,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::BackupIo(_) => 3002,
            Self::SnapshotParse(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Codec(CodecError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest(_) | Self::Rejected(_) | Self::Codec(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::EntryNotFound(_) | Self::BackupNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Persistence(_)
            | Self::BackupIo(_)
            | Self::SnapshotParse(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
