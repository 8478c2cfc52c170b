//! Backup DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for `POST /api/backup/create`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupCreatedResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Snapshot file name (no directory).
    pub file_name: String,
}

/// Response body for `GET /api/backup/list`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BackupListResponse {
    /// Snapshot file names, newest first.
    pub backups: Vec<String>,
}

/// Request body for `POST /api/backup/restore`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBackupRequest {
    /// Snapshot file name as returned by the list endpoint.
    pub file_name: String,
}

/// Response body for `POST /api/backup/restore`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBackupResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Number of entries re-created.
    pub restored: usize,
}
