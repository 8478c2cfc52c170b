//! Binary workbook codec: `calamine` for reading, `rust_xlsxwriter` for
//! writing.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::Value;

use super::CodecError;
use super::columns::{Columns, exact_f64, number_value, text_value};
use crate::domain::Row;

/// Name of the single sheet produced by [`encode_workbook`].
pub const SHEET_NAME: &str = "Data";

/// Decodes the first sheet of an `.xlsx`/`.xls`/`.xlsb`/`.ods` workbook into
/// header-keyed rows.
///
/// # Errors
///
/// - [`CodecError::Malformed`] if the bytes are not a readable workbook.
/// - [`CodecError::EmptyWorkbook`] if the workbook has no sheets.
/// - [`CodecError::EmptyData`] if the first sheet has no data rows.
pub fn decode_workbook(bytes: &[u8]) -> Result<Vec<Row>, CodecError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CodecError::Malformed(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CodecError::EmptyWorkbook)?
        .map_err(|e| CodecError::Malformed(e.to_string()))?;

    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Err(CodecError::EmptyData);
    };
    let mut columns = Columns::from_header(header.iter().map(header_text));

    let rows: Vec<Row> = lines
        .filter_map(|cells| columns.row(cells.iter().map(cell_value)))
        .collect();

    if rows.is_empty() {
        return Err(CodecError::EmptyData);
    }
    Ok(rows)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => text_value(s),
        Data::Float(f) => number_value(*f),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Serial date number, as the sheet stores it.
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::Error(e) => Some(Value::String(e.to_string())),
    }
}

/// Encodes rows as a single-sheet `.xlsx` workbook.
///
/// The header row lists the first row's keys in order, followed by any key
/// first seen in a later row. Missing, `null` and empty-string cells are
/// left empty, since a worksheet has no empty-string cell. Integers beyond
/// ±2^53 are written as text so no digit is lost. Nested arrays/objects are
/// written as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the workbook cannot be built (for
/// example, a cell exceeds Excel's string or grid limits).
pub fn encode_workbook(rows: &[Row]) -> Result<Vec<u8>, CodecError> {
    let headers = header_union(rows);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(encode_err)?;

    for (col, key) in headers.iter().enumerate() {
        sheet
            .write_string(0, col_num(col)?, key.as_str())
            .map_err(encode_err)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let line = u32::try_from(idx + 1)
            .map_err(|_| CodecError::Encode("too many rows".to_string()))?;
        for (col, key) in headers.iter().enumerate() {
            if let Some(value) = row.get(key.as_str()) {
                write_cell(sheet, line, col_num(col)?, value)?;
            }
        }
    }

    workbook.save_to_buffer().map_err(encode_err)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Null => return Ok(()),
        Value::String(s) if s.is_empty() => return Ok(()),
        Value::String(s) => sheet.write_string(row, col, s.as_str()),
        Value::Number(n) => match exact_f64(n) {
            Some(f) => sheet.write_number(row, col, f),
            None => sheet.write_string(row, col, n.to_string()),
        },
        Value::Bool(b) => sheet.write_boolean(row, col, *b),
        nested @ (Value::Array(_) | Value::Object(_)) => {
            sheet.write_string(row, col, nested.to_string())
        }
    }
    .map_err(encode_err)?;
    Ok(())
}

/// Keys in first-seen order across all rows, starting with the first row.
fn header_union(rows: &[Row]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

fn col_num(idx: usize) -> Result<u16, CodecError> {
    u16::try_from(idx).map_err(|_| CodecError::Encode("too many columns".to_string()))
}

#[allow(clippy::needless_pass_by_value)]
fn encode_err(err: XlsxError) -> CodecError {
    CodecError::Encode(err.to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        let Value::Array(items) = value else {
            panic!("expected array");
        };
        items
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => panic!("expected object"),
            })
            .collect()
    }

    #[test]
    fn round_trip_preserves_values_and_column_order() {
        let original = rows(json!([
            {"name": "Alice", "age": 30, "score": 9.5, "member": true},
            {"name": "Bob", "age": 41, "score": 7.25, "member": false},
        ]));
        let Ok(bytes) = encode_workbook(&original) else {
            panic!("encode failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, original);
        let Some(first) = decoded.first() else {
            panic!("no rows");
        };
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age", "score", "member"]);
    }

    #[test]
    fn later_keys_are_appended_to_header() {
        let original = rows(json!([
            {"a": "1"},
            {"a": "2", "b": "x"},
        ]));
        let Ok(bytes) = encode_workbook(&original) else {
            panic!("encode failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, original);
    }

    #[test]
    fn null_cells_render_empty() {
        let original = rows(json!([
            {"a": "1", "b": null},
            {"a": "2", "b": "y"},
        ]));
        let Ok(bytes) = encode_workbook(&original) else {
            panic!("encode failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, rows(json!([{"a": "1"}, {"a": "2", "b": "y"}])));
    }

    #[test]
    fn header_only_sheet_is_empty_data() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let written = sheet
            .write_string(0, 0, "only")
            .and_then(|s| s.write_string(0, 1, "headers"));
        assert!(written.is_ok());
        let Ok(bytes) = workbook.save_to_buffer() else {
            panic!("save failed");
        };
        assert!(matches!(decode_workbook(&bytes), Err(CodecError::EmptyData)));
    }

    #[test]
    fn reads_first_sheet_only() {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        let ok = first
            .write_string(0, 0, "k")
            .and_then(|s| s.write_string(1, 0, "first"));
        assert!(ok.is_ok());
        let second = workbook.add_worksheet();
        let ok = second
            .write_string(0, 0, "k")
            .and_then(|s| s.write_string(1, 0, "second"));
        assert!(ok.is_ok());
        let Ok(bytes) = workbook.save_to_buffer() else {
            panic!("save failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, rows(json!([{"k": "first"}])));
    }

    #[test]
    fn large_integers_keep_every_digit() {
        let original = rows(json!([
            {"id": 9_007_199_254_740_993_u64, "small": 42, "neg": -9_007_199_254_740_993_i64},
        ]));
        let Ok(bytes) = encode_workbook(&original) else {
            panic!("encode failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(
            decoded,
            rows(json!([
                {"id": "9007199254740993", "small": 42, "neg": "-9007199254740993"},
            ]))
        );
    }

    #[test]
    fn empty_strings_render_as_empty_cells() {
        let original = rows(json!([
            {"a": "x", "b": ""},
            {"a": "y", "b": "z"},
        ]));
        let Ok(bytes) = encode_workbook(&original) else {
            panic!("encode failed");
        };
        let Ok(decoded) = decode_workbook(&bytes) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, rows(json!([{"a": "x"}, {"a": "y", "b": "z"}])));
    }

    /// A bare `.xlsx` package: a workbook part with an empty sheet list and no
    /// relationships.
    fn sheetless_workbook() -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        use zip::{CompressionMethod, ZipWriter};

        let parts = [
            ("xl/workbook.xml", "<workbook><sheets/></workbook>"),
            ("xl/_rels/workbook.xml.rels", "<Relationships></Relationships>"),
        ];

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, body) in parts {
            let Ok(()) = writer.start_file(name, options) else {
                panic!("zip entry {name}");
            };
            let Ok(()) = writer.write_all(body.as_bytes()) else {
                panic!("zip write {name}");
            };
        }
        let Ok(cursor) = writer.finish() else {
            panic!("zip finish");
        };
        cursor.into_inner()
    }

    #[test]
    fn workbook_without_sheets_is_empty_workbook() {
        assert_eq!(
            decode_workbook(&sheetless_workbook()),
            Err(CodecError::EmptyWorkbook)
        );
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        assert!(matches!(
            decode_workbook(b"definitely not a workbook"),
            Err(CodecError::Malformed(_))
        ));
    }
}
