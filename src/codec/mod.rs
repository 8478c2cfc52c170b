//! Tabular codec: raw spreadsheet bytes or pasted text ⇄ header-keyed rows.
//!
//! Every decode path produces the same shape, `Vec<Row>`, where each row maps
//! the first line's headers to that line's cell values. Pasted text is also
//! available as a raw grid via [`decode_pasted`] for callers that want the
//! cells before header keying.

mod columns;
pub mod delimited;
pub mod workbook;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use columns::EMPTY_HEADER;
use columns::compact_row;
pub use delimited::{decode_csv, decode_pasted, decode_pasted_rows, rows_from_grid};
pub use workbook::{SHEET_NAME, decode_workbook, encode_workbook};

use crate::domain::Row;

/// MIME type of the workbooks produced by [`encode`].
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Codec failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The workbook contains no sheets.
    #[error("no sheets found in the workbook")]
    EmptyWorkbook,

    /// The first sheet (or the text) has a header but no data rows.
    #[error("no data found in the file")]
    EmptyData,

    /// The bytes could not be parsed as the declared kind.
    #[error("unreadable spreadsheet: {0}")]
    Malformed(String),

    /// Rows could not be written out as a workbook.
    #[error("failed to build workbook: {0}")]
    Encode(String),
}

/// Tabular payload as submitted by a client or found in an older snapshot:
/// either rows already keyed by header, or a raw grid whose first line is
/// the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabularData {
    /// Header-keyed rows; stored minus blank cells.
    Rows(Vec<Row>),
    /// Rows of cells; keyed with [`rows_from_grid`] before storage.
    Grid(Vec<Vec<Value>>),
}

impl TabularData {
    /// Normalizes to header-keyed rows.
    ///
    /// `null` and empty-string cells are dropped from keyed rows, and rows
    /// left with no cells are dropped, so stored data looks exactly like
    /// what a decoder would produce and survives a workbook round trip.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows.into_iter().filter_map(compact_row).collect(),
            Self::Grid(grid) => rows_from_grid(grid),
        }
    }
}

/// Declared kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Binary spreadsheet workbook (`.xlsx`, `.xls`).
    Workbook,
    /// Comma-separated text.
    Csv,
}

impl SourceKind {
    /// Picks the decoder from the file name, falling back to the declared
    /// content type. Anything not recognisably CSV is treated as a workbook.
    #[must_use]
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Self {
        let is_csv_ext = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let is_csv_mime = content_type.is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/csv"))
        });
        if is_csv_ext || is_csv_mime {
            Self::Csv
        } else {
            Self::Workbook
        }
    }
}

/// Decodes uploaded bytes of the given kind into header-keyed rows.
///
/// # Errors
///
/// See [`decode_workbook`] and [`decode_csv`].
pub fn decode(bytes: &[u8], kind: SourceKind) -> Result<Vec<Row>, CodecError> {
    match kind {
        SourceKind::Workbook => decode_workbook(bytes),
        SourceKind::Csv => decode_csv(bytes),
    }
}

/// Encodes rows as downloadable `.xlsx` bytes.
///
/// # Errors
///
/// See [`encode_workbook`].
pub fn encode(rows: &[Row]) -> Result<Vec<u8>, CodecError> {
    encode_workbook(rows)
}
