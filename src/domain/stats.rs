//! Summary counters derived from the entry set.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Entry;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    /// Number of stored entries.
    pub total_files: i64,
    /// Sum of `record_count` across entries (not recomputed from rows).
    pub total_records: i64,
    /// Entries whose `created_at` lies in the current UTC calendar month.
    pub this_month: i64,
}

impl EntryStats {
    /// Folds `entries` into counters, using `now` to pick the current month.
    ///
    /// The declared `month`/`year` of an entry play no part here.
    pub fn from_entries<'a, I>(entries: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let (start, end) = month_bounds(now);
        entries
            .into_iter()
            .fold(Self::default(), |mut acc, entry| {
                acc.total_files += 1;
                acc.total_records += i64::from(entry.record_count);
                if entry.created_at >= start && entry.created_at < end {
                    acc.this_month += 1;
                }
                acc
            })
    }
}

/// Half-open `[start, end)` bounds of the UTC calendar month containing `now`.
#[must_use]
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    (
        start_of_month(now.year(), now.month()).unwrap_or(now),
        start_of_month(next_year, next_month).unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

fn start_of_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Month, NewEntry};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        let Some(ts) = start_of_month(y, m).map(|s| s + chrono::Duration::days(i64::from(d - 1)))
        else {
            panic!("valid date");
        };
        ts
    }

    fn entry(records: i32, created: DateTime<Utc>) -> Entry {
        let mut e = NewEntry::counted(Month::March, 2024, None, vec![]).into_entry(created);
        e.record_count = records;
        e
    }

    #[test]
    fn bounds_cover_whole_month() {
        let (start, end) = month_bounds(at(2024, 2, 15));
        assert_eq!(start, at(2024, 2, 1));
        assert_eq!(end, at(2024, 3, 1));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(at(2023, 12, 31));
        assert_eq!(start, at(2023, 12, 1));
        assert_eq!(end, at(2024, 1, 1));
    }

    #[test]
    fn counts_this_month_by_created_at_only() {
        let now = at(2024, 3, 20);
        let entries = [
            entry(5, at(2024, 3, 2)),
            entry(3, at(2024, 3, 19)),
            entry(7, at(2024, 2, 28)),
            entry(1, at(2023, 3, 10)),
        ];
        let stats = EntryStats::from_entries(&entries, now);
        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.total_records, 16);
        assert_eq!(stats.this_month, 2);
    }

    #[test]
    fn empty_set_is_all_zero() {
        let none: [Entry; 0] = [];
        assert_eq!(
            EntryStats::from_entries(&none, Utc::now()),
            EntryStats::default()
        );
    }
}
