//! Entry service: ingestion, retrieval and export of spreadsheet entries.

use std::sync::Arc;

use crate::codec::{self, SourceKind, TabularData};
use crate::domain::{Entry, EntryId, EntryStats, Month, NewEntry, Row};
use crate::error::AppError;
use crate::ingest::{UploadLimits, UploadMeta, validate};
use crate::persistence::EntryStore;

/// Label stored for entries that did not come from a named file.
pub const PASTED_FILE_NAME: &str = "pasted_data.xlsx";

/// Download name used when an entry has no label.
pub const DEFAULT_DOWNLOAD_NAME: &str = "data.xlsx";

/// Direct submission of already-tabular data.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Reporting month, as typed by the client.
    pub month: String,
    /// Reporting year.
    pub year: i32,
    /// Display label; defaults to [`PASTED_FILE_NAME`].
    pub file_name: Option<String>,
    /// Keyed rows or a raw grid.
    pub data: TabularData,
    /// Client-supplied count, trusted as given when present.
    pub record_count: Option<i32>,
    /// Owner, if any.
    pub user_id: Option<String>,
}

/// Multipart upload after the form has been read.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
    /// `month` form field.
    pub month: Option<String>,
    /// `year` form field.
    pub year: Option<String>,
}

/// Workbook ready to send to a client.
#[derive(Debug, Clone)]
pub struct Download {
    /// Suggested attachment name, always ending in `.xlsx`.
    pub file_name: String,
    /// `.xlsx` bytes.
    pub bytes: Vec<u8>,
}

/// Orchestrates the codec, the validator and the entry store.
///
/// CPU-bound decoding and encoding run on Tokio's blocking pool so large
/// workbooks do not stall the request executor.
#[derive(Debug, Clone)]
pub struct EntryService {
    store: Arc<EntryStore>,
    limits: UploadLimits,
}

impl EntryService {
    /// Creates a new `EntryService`.
    #[must_use]
    pub fn new(store: Arc<EntryStore>, limits: UploadLimits) -> Self {
        Self { store, limits }
    }

    /// Returns a reference to the inner [`EntryStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    /// Upload limits enforced by [`Self::ingest_upload`].
    #[must_use]
    pub const fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Stores directly submitted rows.
    ///
    /// A raw grid is keyed by its first line. `record_count` defaults to the
    /// number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] for an unknown month, or
    /// [`AppError::Persistence`] if the entry cannot be stored.
    pub async fn submit(&self, submission: Submission) -> Result<Entry, AppError> {
        let month = parse_month(&submission.month)?;
        let data = submission.data.into_rows();
        let mut new = NewEntry::counted(
            month,
            submission.year,
            Some(
                submission
                    .file_name
                    .unwrap_or_else(|| PASTED_FILE_NAME.to_string()),
            ),
            data,
        );
        if let Some(count) = submission.record_count {
            new.record_count = count;
        }
        new.user_id = submission.user_id;

        let entry = self.store.create(new).await?;
        tracing::info!(id = %entry.id, records = entry.record_count, "entry submitted");
        Ok(entry)
    }

    /// Stores text pasted from a spreadsheet (tab-separated lines, first line
    /// the header).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] for an unknown month,
    /// [`AppError::Codec`] if the text holds no data rows, or
    /// [`AppError::Persistence`] if the entry cannot be stored.
    pub async fn submit_pasted(
        &self,
        month: &str,
        year: i32,
        text: String,
        file_name: Option<String>,
    ) -> Result<Entry, AppError> {
        let month = parse_month(month)?;
        let rows = tokio::task::spawn_blocking(move || codec::decode_pasted_rows(&text))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let new = NewEntry::counted(
            month,
            year,
            Some(file_name.unwrap_or_else(|| PASTED_FILE_NAME.to_string())),
            rows,
        );
        let entry = self.store.create(new).await?;
        tracing::info!(id = %entry.id, records = entry.record_count, "pasted entry stored");
        Ok(entry)
    }

    /// Validates, decodes and stores an uploaded spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Rejected`] if validation fails,
    /// [`AppError::InvalidRequest`] for an unparseable month or year,
    /// [`AppError::Codec`] if the file cannot be decoded, or
    /// [`AppError::Persistence`] if the entry cannot be stored.
    pub async fn ingest_upload(&self, upload: Upload) -> Result<Entry, AppError> {
        let meta = UploadMeta {
            file_name: &upload.file_name,
            content_type: upload.content_type.as_deref(),
            size: u64::try_from(upload.bytes.len()).unwrap_or(u64::MAX),
            month: upload.month.as_deref(),
            year: upload.year.as_deref(),
        };
        if let Err(rejection) = validate(&meta, &self.limits) {
            tracing::warn!(file = %upload.file_name, %rejection, "upload rejected");
            return Err(rejection.into());
        }

        let month = parse_month(upload.month.as_deref().unwrap_or_default())?;
        let year = parse_year(upload.year.as_deref().unwrap_or_default())?;
        let kind = SourceKind::detect(&upload.file_name, upload.content_type.as_deref());

        let bytes = upload.bytes;
        let rows = tokio::task::spawn_blocking(move || codec::decode(&bytes, kind))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let new = NewEntry::counted(month, year, Some(upload.file_name), rows);
        let entry = self.store.create(new).await?;
        tracing::info!(
            id = %entry.id,
            file = entry.file_name.as_deref().unwrap_or_default(),
            records = entry.record_count,
            ?kind,
            "upload ingested"
        );
        Ok(entry)
    }

    /// Fetches one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] for an unknown id.
    pub async fn get(&self, id: EntryId) -> Result<Entry, AppError> {
        self.store.get(id).await
    }

    /// Lists all entries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on storage failure.
    pub async fn list(&self) -> Result<Vec<Entry>, AppError> {
        self.store.list().await
    }

    /// Deletes one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] for an unknown id.
    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        self.store.delete(id).await?;
        tracing::info!(%id, "entry deleted");
        Ok(())
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on storage failure.
    pub async fn stats(&self) -> Result<EntryStats, AppError> {
        self.store.stats().await
    }

    /// Re-encodes an entry's rows as an `.xlsx` workbook.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] for an unknown id, or
    /// [`AppError::Codec`] if the workbook cannot be built.
    pub async fn download(&self, id: EntryId) -> Result<Download, AppError> {
        let entry = self.store.get(id).await?;
        let file_name = download_name(entry.file_name.as_deref());
        let rows: Vec<Row> = entry.data;
        let bytes = tokio::task::spawn_blocking(move || codec::encode(&rows))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;
        Ok(Download { file_name, bytes })
    }
}

fn parse_month(raw: &str) -> Result<Month, AppError> {
    raw.parse::<Month>()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))
}

fn parse_year(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::InvalidRequest(format!("invalid year: {raw:?}")))
}

/// Attachment name for a download: the stored label with its extension
/// swapped for `.xlsx`, or [`DEFAULT_DOWNLOAD_NAME`].
fn download_name(label: Option<&str>) -> String {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return DEFAULT_DOWNLOAD_NAME.to_string();
    };
    let stem = match label.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => label,
    };
    format!("{stem}.xlsx")
}
