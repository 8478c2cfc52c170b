//! Stored spreadsheet entry and its metadata.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntryId;

/// One decoded spreadsheet row: column key → scalar cell value.
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration follows
/// the column order the codec encountered.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Calendar month declared by the submitter.
///
/// Serialized as the canonical lowercase English name (`"march"`). This is
/// independent of the entry's `created_at` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    /// January.
    January,
    /// February.
    February,
    /// March.
    March,
    /// April.
    April,
    /// May.
    May,
    /// June.
    June,
    /// July.
    July,
    /// August.
    August,
    /// September.
    September,
    /// October.
    October,
    /// November.
    November,
    /// December.
    December,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::January => "january",
            Self::February => "february",
            Self::March => "march",
            Self::April => "april",
            Self::May => "may",
            Self::June => "june",
            Self::July => "july",
            Self::August => "august",
            Self::September => "september",
            Self::October => "october",
            Self::November => "november",
            Self::December => "december",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a month name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown month: {0}")]
pub struct UnknownMonth(pub String);

impl FromStr for Month {
    type Err = UnknownMonth;

    /// Accepts month names case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// Lifecycle status of an entry.
///
/// Every entry is created `active`; nothing transitions it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Visible on the dashboard.
    #[default]
    Active,
    /// Retained but hidden.
    Archived,
}

impl EntryStatus {
    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parses the stored column value, treating anything unrecognised as
    /// archived so that it never shows up as live data.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        if value == "active" {
            Self::Active
        } else {
            Self::Archived
        }
    }
}

/// A stored unit of tabular data plus its metadata.
///
/// Serialized in camelCase; the same shape is used by the HTTP API and by
/// backup snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Store-assigned identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: EntryId,
    /// Optional submitter reference (not enforced).
    #[serde(default)]
    pub user_id: Option<String>,
    /// Declared month.
    pub month: Month,
    /// Declared year. No range is enforced.
    pub year: i32,
    /// Display label; `None` when the submitter gave none.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Rows keyed by column header.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Row>,
    /// Caller-supplied number of data rows.
    pub record_count: i32,
    /// Lifecycle status.
    #[serde(default)]
    pub status: EntryStatus,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
    /// Set on insert; entries are never updated in place.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller when creating an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    /// Declared month.
    pub month: Month,
    /// Declared year.
    pub year: i32,
    /// Display label.
    pub file_name: Option<String>,
    /// Rows keyed by column header.
    pub data: Vec<Row>,
    /// Trusted as given; not cross-checked against `data.len()`.
    pub record_count: i32,
    /// Optional submitter reference.
    pub user_id: Option<String>,
}

impl NewEntry {
    /// Builds a `NewEntry` whose `record_count` is the number of rows.
    #[must_use]
    pub fn counted(month: Month, year: i32, file_name: Option<String>, data: Vec<Row>) -> Self {
        let record_count = i32::try_from(data.len()).unwrap_or(i32::MAX);
        Self {
            month,
            year,
            file_name,
            data,
            record_count,
            user_id: None,
        }
    }

    /// Materialises the entry with a fresh id and the given timestamp.
    #[must_use]
    pub fn into_entry(self, now: DateTime<Utc>) -> Entry {
        Entry {
            id: EntryId::new(),
            user_id: self.user_id,
            month: self.month,
            year: self.year,
            file_name: self.file_name,
            data: self.data,
            record_count: self.record_count,
            status: EntryStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<Entry> for NewEntry {
    /// Carries over the caller-owned fields; id, status and timestamps are
    /// dropped so the store assigns fresh ones.
    fn from(entry: Entry) -> Self {
        Self {
            month: entry.month,
            year: entry.year,
            file_name: entry.file_name,
            data: entry.data,
            record_count: entry.record_count,
            user_id: entry.user_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn month_parses_case_insensitively() {
        assert_eq!("March".parse::<Month>(), Ok(Month::March));
        assert_eq!(" december ".parse::<Month>(), Ok(Month::December));
        assert!("marzo".parse::<Month>().is_err());
    }

    #[test]
    fn month_serializes_lowercase() {
        let Ok(json) = serde_json::to_string(&Month::September) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"september\"");
    }

    #[test]
    fn entry_serializes_camel_case() {
        let mut row = Row::new();
        row.insert("a".to_string(), json!("1"));
        let entry = NewEntry::counted(Month::March, 2024, None, vec![row]).into_entry(Utc::now());

        let Ok(value) = serde_json::to_value(&entry) else {
            panic!("serialization failed");
        };
        assert_eq!(value["recordCount"], json!(1));
        assert_eq!(value["status"], json!("active"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("fileName").is_some());
    }

    #[test]
    fn into_new_entry_keeps_caller_fields() {
        let mut entry = NewEntry::counted(Month::May, 2023, Some("x.csv".to_string()), vec![])
            .into_entry(Utc::now());
        entry.record_count = 42;
        let new: NewEntry = entry.into();
        assert_eq!(new.record_count, 42);
        assert_eq!(new.file_name.as_deref(), Some("x.csv"));
    }

    #[test]
    fn unknown_status_is_archived() {
        assert_eq!(EntryStatus::from_db("active"), EntryStatus::Active);
        assert_eq!(EntryStatus::from_db("deleted"), EntryStatus::Archived);
    }
}
