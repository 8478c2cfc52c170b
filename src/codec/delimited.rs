//! Delimited-text decoding: uploaded CSV files and pasted tab-separated text.

use serde_json::Value;

use super::CodecError;
use super::columns::{Columns, is_blank, text_value};
use crate::domain::Row;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes a comma-separated file into header-keyed rows.
///
/// Every cell stays a string: `a,b` / `1,2` yields `[{"a": "1", "b": "2"}]`.
/// Records may be ragged; cells past the header get `__EMPTY` keys.
///
/// # Errors
///
/// - [`CodecError::Malformed`] on invalid UTF-8 or broken quoting.
/// - [`CodecError::EmptyData`] if there is no record after the header.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<Row>, CodecError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| CodecError::Malformed(e.to_string()))?,
        None => return Err(CodecError::EmptyData),
    };
    let mut columns = Columns::from_header(header.iter());

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| CodecError::Malformed(e.to_string()))?;
        if let Some(row) = columns.row(record.iter().map(text_value)) {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(CodecError::EmptyData);
    }
    Ok(rows)
}

/// Splits pasted spreadsheet text into a raw grid of cells.
///
/// Lines split on `\n` (a trailing `\r` is dropped), lines that are blank
/// after trimming are skipped, and cells split on `\t`. No header handling
/// happens here; the first line is returned like any other.
#[must_use]
pub fn decode_pasted(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Keys a raw grid by its first line, using the same header rules as the
/// file decoders. The header line is not returned as a row.
///
/// Grid cells may be any JSON scalar; empty strings and `null` are treated
/// as missing.
#[must_use]
pub fn rows_from_grid(grid: Vec<Vec<Value>>) -> Vec<Row> {
    let mut lines = grid.into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let mut columns = Columns::from_header(header.iter().map(grid_header_text));
    lines
        .filter_map(|cells| columns.row(cells.into_iter().map(grid_cell)))
        .collect()
}

/// Pasted text → header-keyed rows.
///
/// # Errors
///
/// Returns [`CodecError::EmptyData`] when the text has no line after the
/// header.
pub fn decode_pasted_rows(text: &str) -> Result<Vec<Row>, CodecError> {
    let grid = decode_pasted(text)
        .into_iter()
        .map(|line| line.into_iter().map(Value::String).collect())
        .collect();
    let rows = rows_from_grid(grid);
    if rows.is_empty() {
        return Err(CodecError::EmptyData);
    }
    Ok(rows)
}

fn grid_header_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn grid_cell(cell: Value) -> Option<Value> {
    (!is_blank(&cell)).then_some(cell)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_header_keys_rows_as_strings() {
        let Ok(rows) = decode_csv(b"a,b\n1,2\n") else {
            panic!("decode failed");
        };
        assert_eq!(rows.len(), 1);
        let first = rows.into_iter().next().unwrap_or_default();
        assert_eq!(Value::Object(first), json!({"a": "1", "b": "2"}));
    }

    #[test]
    fn csv_strips_bom_and_handles_quotes() {
        let Ok(rows) = decode_csv(b"\xEF\xBB\xBFname,note\r\n\"Doe, Jane\",\"said \"\"hi\"\"\"\r\n")
        else {
            panic!("decode failed");
        };
        let Some(row) = rows.first() else {
            panic!("no rows");
        };
        assert_eq!(row.get("name"), Some(&json!("Doe, Jane")));
        assert_eq!(row.get("note"), Some(&json!("said \"hi\"")));
    }

    #[test]
    fn csv_header_only_is_empty_data() {
        assert!(matches!(decode_csv(b"a,b\n"), Err(CodecError::EmptyData)));
        assert!(matches!(decode_csv(b""), Err(CodecError::EmptyData)));
    }

    #[test]
    fn csv_skips_rows_with_no_cells() {
        let Ok(rows) = decode_csv(b"a,b\n,\n3,\n") else {
            panic!("decode failed");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().and_then(|r| r.get("a")), Some(&json!("3")));
        assert_eq!(rows.first().and_then(|r| r.get("b")), None);
    }

    #[test]
    fn csv_rejects_invalid_utf8() {
        assert!(matches!(
            decode_csv(b"a\n\xFF\xFE\n"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn pasted_text_splits_on_tabs_and_drops_blank_lines() {
        let grid = decode_pasted("h1\th2\r\n\n  \nx\ty\n");
        assert_eq!(
            grid,
            vec![
                vec!["h1".to_string(), "h2".to_string()],
                vec!["x".to_string(), "y".to_string()],
            ]
        );
    }

    #[test]
    fn pasted_rows_are_keyed_by_first_line() {
        let Ok(rows) = decode_pasted_rows("month\ttotal\nmarch\t12\napril\t\n") else {
            panic!("decode failed");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.first().and_then(|r| r.get("total")), Some(&json!("12")));
        assert_eq!(rows.get(1).and_then(|r| r.get("total")), None);
    }

    #[test]
    fn pasted_header_only_is_empty_data() {
        assert!(matches!(
            decode_pasted_rows("a\tb\n"),
            Err(CodecError::EmptyData)
        ));
    }

    #[test]
    fn grid_accepts_non_string_scalars() {
        let rows = rows_from_grid(vec![
            vec![json!("id"), json!("qty")],
            vec![json!(1), json!(null)],
        ]);
        assert_eq!(rows, vec![json!({"id": 1}).as_object().cloned().unwrap_or_default()]);
    }
}
