//! Multipart upload handler.

use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::Entry;
use crate::error::{AppError, ErrorResponse};
use crate::ingest::Rejection;
use crate::service::Upload;

/// `POST /excel-data/upload`: Store an uploaded `.xlsx`, `.xls` or `.csv`.
///
/// Form fields: `file` (the spreadsheet), `month`, `year`. Unknown fields
/// are ignored.
///
/// # Errors
///
/// Returns [`AppError`] if the file is missing, too large, of an
/// unsupported type, unreadable, or if `month`/`year` are missing or invalid.
#[utoipa::path(
    post,
    path = "/api/excel-data/upload",
    tag = "Entries",
    summary = "Upload a spreadsheet",
    description = "Multipart form with `file`, `month` and `year`. The first sheet is decoded; its first row is the header.",
    responses(
        (status = 201, description = "Entry stored", body = Entry),
        (status = 400, description = "Rejected or unreadable upload", body = ErrorResponse),
    )
)]
pub async fn upload_entry(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = Upload::default();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await.map_err(form_error)?.to_vec();
                has_file = true;
            }
            Some("month") => upload.month = Some(field.text().await.map_err(form_error)?),
            Some("year") => upload.year = Some(field.text().await.map_err(form_error)?),
            _ => {}
        }
    }

    if !has_file {
        return Err(Rejection::MissingFile.into());
    }

    let entry = state.entry_service.ingest_upload(upload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

fn form_error(err: MultipartError) -> AppError {
    AppError::InvalidRequest(format!("malformed multipart body: {}", err.body_text()))
}

/// Upload route, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/excel-data/upload", post(upload_entry))
}
