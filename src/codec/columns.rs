//! Header naming and row keying shared by every decode path.

use std::collections::HashSet;

use serde_json::{Number, Value};

use crate::domain::Row;

/// Key given to a column whose header cell is blank.
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Column keys derived from a header row.
///
/// Blank headers become `__EMPTY`, `__EMPTY_1`, ...; a repeated header gets
/// a `_1`, `_2`, ... suffix so every key in a row is unique. Columns past the
/// end of the header row are named as blanks on first use.
#[derive(Debug, Default)]
pub(crate) struct Columns {
    keys: Vec<String>,
    taken: HashSet<String>,
}

impl Columns {
    pub(crate) fn from_header<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = Self::default();
        for cell in cells {
            columns.push(cell.as_ref());
        }
        columns
    }

    fn push(&mut self, raw: &str) {
        let base = if raw.trim().is_empty() {
            EMPTY_HEADER
        } else {
            raw
        };
        let mut candidate = base.to_string();
        let mut n = 0usize;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.taken.insert(candidate.clone());
        self.keys.push(candidate);
    }

    fn key(&mut self, idx: usize) -> String {
        while self.keys.len() <= idx {
            self.push("");
        }
        self.keys.get(idx).cloned().unwrap_or_default()
    }

    /// Keys one record. Absent cells are left out of the map; returns `None`
    /// when the record has no cells at all.
    pub(crate) fn row<I>(&mut self, cells: I) -> Option<Row>
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let mut row = Row::new();
        for (idx, cell) in cells.into_iter().enumerate() {
            if let Some(value) = cell {
                let key = self.key(idx);
                row.insert(key, value);
            }
        }
        (!row.is_empty()).then_some(row)
    }
}

/// Integers up to this magnitude convert to and from `f64` exactly.
const MAX_EXACT_INT: u64 = 1 << 53;

/// Converts a float cell into a JSON number, collapsing integral values to
/// integers so that `5` survives a trip through a workbook unchanged.
pub(crate) fn number_value(f: f64) -> Option<Value> {
    #[allow(clippy::cast_precision_loss)]
    let max_exact = MAX_EXACT_INT as f64;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= max_exact {
        #[allow(clippy::cast_possible_truncation)]
        let int = f as i64;
        return Some(Value::from(int));
    }
    serde_json::Number::from_f64(f).map(Value::Number)
}

/// A number as a worksheet float, or `None` for an integer beyond ±2^53
/// that a float cell would round.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn exact_f64(n: &Number) -> Option<f64> {
    if let Some(i) = n.as_i64() {
        return (i.unsigned_abs() <= MAX_EXACT_INT).then_some(i as f64);
    }
    if let Some(u) = n.as_u64() {
        return (u <= MAX_EXACT_INT).then_some(u as f64);
    }
    n.as_f64()
}

/// Treats empty strings as missing cells.
pub(crate) fn text_value(s: &str) -> Option<Value> {
    (!s.is_empty()).then(|| Value::String(s.to_string()))
}

/// `null` and `""`: values no decoder ever keys into a row.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Drops blank cells from a submitted row, the same way the decoders skip
/// empty cells. Returns `None` when nothing is left.
pub(crate) fn compact_row(row: Row) -> Option<Row> {
    let row: Row = row.into_iter().filter(|(_, v)| !is_blank(v)).collect();
    (!row.is_empty()).then_some(row)
}
