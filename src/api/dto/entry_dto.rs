//! Entry DTOs for submission and paste requests.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::codec::TabularData;
use crate::service::Submission;

/// Request body for `POST /api/excel-data`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    /// Reporting month name, case-insensitive (`"March"`, `"march"`).
    pub month: String,
    /// Reporting year.
    pub year: i32,
    /// Display label. Defaults to `pasted_data.xlsx`.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Header-keyed rows, or a grid of cells whose first line is the header.
    #[schema(value_type = Vec<Object>)]
    pub data: TabularData,
    /// Row count to record. Defaults to the number of stored rows.
    #[serde(default)]
    pub record_count: Option<i32>,
    /// Owner, if any.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<CreateEntryRequest> for Submission {
    fn from(req: CreateEntryRequest) -> Self {
        Self {
            month: req.month,
            year: req.year,
            file_name: req.file_name,
            data: req.data,
            record_count: req.record_count,
            user_id: req.user_id,
        }
    }
}

/// Request body for `POST /api/excel-data/paste`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasteEntryRequest {
    /// Reporting month name, case-insensitive.
    pub month: String,
    /// Reporting year.
    pub year: i32,
    /// Text copied from a spreadsheet: tab-separated cells, one row per
    /// line, header first.
    pub text: String,
    /// Display label. Defaults to `pasted_data.xlsx`.
    #[serde(default)]
    pub file_name: Option<String>,
}
