//! Database row shape for the `excel_data` table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{Entry, EntryId, EntryStatus, Month, Row};
use crate::error::AppError;

/// Column list shared by every `SELECT`/`RETURNING` on `excel_data`, in the
/// order of [`EntryRecord`].
pub const ENTRY_COLUMNS: &str =
    "id, user_id, month, year, file_name, data, record_count, status, created_at, updated_at";

/// A stored row from the `excel_data` table.
pub type EntryRecord = (
    Uuid,
    Option<String>,
    String,
    i32,
    Option<String>,
    Json<Vec<Row>>,
    i32,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Serializes entry rows for the `data` column, keys in row order.
///
/// # Errors
///
/// Returns [`AppError::Persistence`] if a value cannot be serialized.
pub fn data_json(rows: &[Row]) -> Result<String, AppError> {
    serde_json::to_string(rows).map_err(|e| AppError::Persistence(e.to_string()))
}

/// Converts a raw table row into an [`Entry`].
///
/// # Errors
///
/// Returns [`AppError::Persistence`] if the stored month is not a month name.
pub fn entry_from_record(record: EntryRecord) -> Result<Entry, AppError> {
    let (
        id,
        user_id,
        month,
        year,
        file_name,
        Json(data),
        record_count,
        status,
        created_at,
        updated_at,
    ) = record;
    let month: Month = month
        .parse()
        .map_err(|e| AppError::Persistence(format!("row {id}: {e}")))?;
    Ok(Entry {
        id: EntryId::from_uuid(id),
        user_id,
        month,
        year,
        file_name,
        data,
        record_count,
        status: EntryStatus::from_db(&status),
        created_at,
        updated_at,
    })
}
