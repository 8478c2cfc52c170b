//! Backup handlers: create, list, restore. All admin only.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BackupCreatedResponse, BackupListResponse, RestoreBackupRequest, RestoreBackupResponse,
};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::auth::AdminAccess;
use crate::error::{AppError, ErrorResponse};

/// `POST /backup/create`: Snapshot the entry store now.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or if the snapshot cannot be
/// written.
#[utoipa::path(
    post,
    path = "/api/backup/create",
    tag = "Backups",
    summary = "Create backup",
    description = "Writes a timestamped JSON snapshot of every entry to the backup directory.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Backup written", body = BackupCreatedResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 500, description = "Snapshot could not be written", body = ErrorResponse),
    )
)]
pub async fn create_backup(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.backups.create_backup().await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(Json(BackupCreatedResponse {
        message: "Backup created successfully".to_string(),
        file_name,
    }))
}

/// `GET /backup/list`: Snapshot file names, newest first.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or if the directory cannot be
/// read.
#[utoipa::path(
    get,
    path = "/api/backup/list",
    tag = "Backups",
    summary = "List backups",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Snapshot names", body = BackupListResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
    )
)]
pub async fn list_backups(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let backups = state.backups.list_backups().await?;
    Ok(Json(BackupListResponse { backups }))
}

/// `POST /backup/restore`: Re-create the entries of one snapshot.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access, an invalid or unknown file
/// name, or an unreadable snapshot.
#[utoipa::path(
    post,
    path = "/api/backup/restore",
    tag = "Backups",
    summary = "Restore backup",
    description = "Adds every entry from the named snapshot to the store with fresh ids. Existing entries are kept.",
    security(("bearer" = [])),
    request_body = RestoreBackupRequest,
    responses(
        (status = 200, description = "Entries restored", body = RestoreBackupResponse),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Snapshot not found", body = ErrorResponse),
    )
)]
pub async fn restore_backup(
    _admin: AdminAccess,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RestoreBackupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let restored = state.backups.restore_named(&req.file_name).await?;
    Ok(Json(RestoreBackupResponse {
        message: "Backup restored successfully".to_string(),
        restored,
    }))
}

/// Backup routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/backup/create", post(create_backup))
        .route("/backup/list", get(list_backups))
        .route("/backup/restore", post(restore_backup))
}
