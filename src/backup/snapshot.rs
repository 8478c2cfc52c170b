//! On-disk snapshot document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::TabularData;
use crate::domain::{Entry, EntryStats, Month, NewEntry};

/// Format version stamped into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// File name prefix shared by every snapshot.
pub const FILE_PREFIX: &str = "backup-";

/// File name extension shared by every snapshot.
pub const FILE_EXTENSION: &str = ".json";

/// Full export of the entry store at one instant.
///
/// Written with `E = Entry`. Read back with `E = SnapshotEntry`, which
/// tolerates snapshots whose `data` is still a raw grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<E = Entry> {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Every entry, most recent first.
    pub excel_data: Vec<E>,
    /// Totals at snapshot time.
    pub metadata: SnapshotMetadata,
}

/// Summary block of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Snapshot format version.
    pub version: String,
    /// Always zero; entries are not tied to accounts.
    #[serde(default)]
    pub total_users: i64,
    /// Number of entries captured.
    pub total_files: i64,
    /// Sum of the captured entries' record counts.
    pub total_records: i64,
}

impl SnapshotMetadata {
    /// Builds the metadata block from store stats.
    #[must_use]
    pub fn from_stats(stats: &EntryStats) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            total_users: 0,
            total_files: stats.total_files,
            total_records: stats.total_records,
        }
    }
}

/// Entry as read back from a snapshot. Ids, status and timestamps are
/// ignored; restore assigns fresh ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    /// Reporting month.
    pub month: Month,
    /// Reporting year.
    pub year: i32,
    /// Display label.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Keyed rows or a raw grid.
    pub data: TabularData,
    /// Stored count; recomputed from `data` when absent.
    #[serde(default)]
    pub record_count: Option<i32>,
    /// Owner, if any.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<SnapshotEntry> for NewEntry {
    fn from(entry: SnapshotEntry) -> Self {
        let data = entry.data.into_rows();
        let record_count = entry
            .record_count
            .unwrap_or_else(|| i32::try_from(data.len()).unwrap_or(i32::MAX));
        Self {
            month: entry.month,
            year: entry.year,
            file_name: entry.file_name,
            data,
            record_count,
            user_id: entry.user_id,
        }
    }
}

/// Snapshot file name for a capture taken at `at`, e.g.
/// `backup-2024-03-05T10-11-12-123456Z.json`.
#[must_use]
pub fn file_name_for(at: DateTime<Utc>) -> String {
    format!(
        "{FILE_PREFIX}{}{FILE_EXTENSION}",
        at.format("%Y-%m-%dT%H-%M-%S-%6fZ")
    )
}

/// Returns `true` for names produced by [`file_name_for`].
#[must_use]
pub fn is_snapshot_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_names_sort_chronologically() {
        let Some(early) = Utc.with_ymd_and_hms(2024, 3, 5, 9, 59, 59).single() else {
            panic!("bad date");
        };
        let Some(late) = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).single() else {
            panic!("bad date");
        };
        let (a, b) = (file_name_for(early), file_name_for(late));
        assert_eq!(a, "backup-2024-03-05T09-59-59-000000Z.json");
        assert!(a < b);
        assert!(is_snapshot_name(&a));
        assert!(!is_snapshot_name("notes.json"));
        assert!(!is_snapshot_name(".backup-x.json.tmp"));
    }

    #[test]
    fn reads_snapshot_with_grid_data_and_extra_fields() {
        let raw = r#"{
            "timestamp": "2024-03-05T10:11:12.123Z",
            "excelData": [{
                "id": "legacy-1",
                "userId": null,
                "month": "march",
                "year": 2024,
                "fileName": "pasted_data.xlsx",
                "data": [["name", "qty"], ["bolt", "4"]],
                "recordCount": 1,
                "status": "active",
                "createdAt": "2024-03-05T10:00:00.000Z"
            }],
            "metadata": {"version": "1.0.0", "totalUsers": 0, "totalFiles": 1, "totalRecords": 1}
        }"#;
        let Ok(snapshot) = serde_json::from_str::<Snapshot<SnapshotEntry>>(raw) else {
            panic!("snapshot should parse");
        };
        let Some(entry) = snapshot.excel_data.into_iter().next() else {
            panic!("one entry expected");
        };
        let new = NewEntry::from(entry);
        assert_eq!(new.month, Month::March);
        assert_eq!(new.record_count, 1);
        let Some(row) = new.data.first() else {
            panic!("one row expected");
        };
        assert_eq!(row.get("qty"), Some(&serde_json::json!("4")));
    }

    #[test]
    fn metadata_uses_camel_case_keys() {
        let stats = EntryStats {
            total_files: 2,
            total_records: 8,
            this_month: 2,
        };
        let Ok(json) = serde_json::to_value(SnapshotMetadata::from_stats(&stats)) else {
            panic!("serialize failed");
        };
        assert_eq!(
            json,
            serde_json::json!({
                "version": "1.0.0",
                "totalUsers": 0,
                "totalFiles": 2,
                "totalRecords": 8,
            })
        );
    }
}
