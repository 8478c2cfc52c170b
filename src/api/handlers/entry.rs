//! Entry handlers: submit, paste, list, stats, get, delete, download.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateEntryRequest, PasteEntryRequest};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::auth::AdminAccess;
use crate::codec::XLSX_CONTENT_TYPE;
use crate::domain::{Entry, EntryId, EntryStats};
use crate::error::{AppError, ErrorResponse};

/// `POST /excel-data`: Store already-tabular data.
///
/// # Errors
///
/// Returns [`AppError`] for an unknown month or a storage failure.
#[utoipa::path(
    post,
    path = "/api/excel-data",
    tag = "Entries",
    summary = "Submit tabular data",
    description = "Stores rows sent as JSON. `data` may be header-keyed rows or a grid whose first line is the header.",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry stored", body = Entry),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.entry_service.submit(req.into()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `POST /excel-data/paste`: Store text pasted from a spreadsheet.
///
/// # Errors
///
/// Returns [`AppError`] for an unknown month, text without data rows, or a
/// storage failure.
#[utoipa::path(
    post,
    path = "/api/excel-data/paste",
    tag = "Entries",
    summary = "Submit pasted text",
    description = "Parses tab-separated text (header line first) and stores the rows.",
    request_body = PasteEntryRequest,
    responses(
        (status = 201, description = "Entry stored", body = Entry),
        (status = 400, description = "Invalid request or no data rows", body = ErrorResponse),
    )
)]
pub async fn paste_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PasteEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .entry_service
        .submit_pasted(&req.month, req.year, req.text, req.file_name)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /excel-data`: List every entry, most recent first.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or storage failure.
#[utoipa::path(
    get,
    path = "/api/excel-data",
    tag = "Entries",
    summary = "List entries",
    description = "Returns all entries ordered by creation time, most recent first. Admin only.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All entries", body = Vec<Entry>),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
    )
)]
pub async fn list_entries(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.entry_service.list().await?;
    Ok(Json(entries))
}

/// `GET /excel-data/stats`: Dashboard counters.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or storage failure.
#[utoipa::path(
    get,
    path = "/api/excel-data/stats",
    tag = "Entries",
    summary = "Entry statistics",
    description = "Total entries, total records, and entries created in the current calendar month (UTC). Admin only.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Counters", body = EntryStats),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
    )
)]
pub async fn entry_stats(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.entry_service.stats().await?;
    Ok(Json(stats))
}

/// `GET /excel-data/{id}`: Fetch one entry.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or an unknown id.
#[utoipa::path(
    get,
    path = "/api/excel-data/{id}",
    tag = "Entries",
    summary = "Get entry",
    description = "Returns one entry including its rows. Admin only.",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Entry identifier")),
    responses(
        (status = 200, description = "Entry", body = Entry),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn get_entry(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.entry_service.get(EntryId::from_uuid(id)).await?;
    Ok(Json(entry))
}

/// `DELETE /excel-data/{id}`: Delete one entry.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access or an unknown id.
#[utoipa::path(
    delete,
    path = "/api/excel-data/{id}",
    tag = "Entries",
    summary = "Delete entry",
    description = "Permanently removes an entry. Admin only.",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Entry identifier")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn delete_entry(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.entry_service.delete(EntryId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /excel-data/{id}/download`: Entry rows as an `.xlsx` attachment.
///
/// # Errors
///
/// Returns [`AppError`] on unauthorized access, an unknown id, or a
/// workbook encoding failure.
#[utoipa::path(
    get,
    path = "/api/excel-data/{id}/download",
    tag = "Entries",
    summary = "Download entry as workbook",
    description = "Re-encodes the stored rows as a single-sheet `.xlsx` workbook. Admin only.",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Entry identifier")),
    responses(
        (status = 200, description = "`.xlsx` workbook sent as an attachment"),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn download_entry(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let download = state.entry_service.download(EntryId::from_uuid(id)).await?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe(&download.file_name)
    ))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    ))
}

/// Replaces characters that cannot appear inside a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Entry routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/excel-data", post(create_entry).get(list_entries))
        .route("/excel-data/paste", post(paste_entry))
        .route("/excel-data/stats", get(entry_stats))
        .route("/excel-data/{id}", get(get_entry).delete(delete_entry))
        .route("/excel-data/{id}/download", get(download_entry))
}
