//! Uploaded-spreadsheet parsing into row objects.
//!
//! Converts spreadsheet rows into JSON objects keyed by header name. No
//! SKU-template logic here - the header row defines the keys, cells become
//! strings, and that is all downstream code gets to see.
//!
//! Excel files (.xlsx, .xls, .xlsm, .xlsb, .ods) are read with calamine from
//! the first sheet. CSV files get encoding auto-detection and delimiter
//! sniffing before going through the `csv` reader.

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use serde_json::{Map, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::{InputParseError, InputResult};

/// Detected format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Excel-family workbook read via calamine.
    Excel,
    /// Delimited text read via the `csv` crate.
    Csv,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Excel => write!(f, "Excel"),
            InputFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// Result of parsing an upload, with metadata for reporting.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows as JSON objects keyed by header name.
    pub records: Vec<Value>,
    /// Non-blank column headers, in sheet order.
    pub headers: Vec<String>,
    /// Sheet the rows came from (Excel only).
    pub sheet_name: Option<String>,
    /// Detected input format.
    pub format: InputFormat,
}

/// Parse an uploaded file, choosing the reader from the file name.
///
/// `.csv` goes through the delimited-text branch; anything else is handed to
/// calamine's workbook auto-detection.
pub fn parse_upload(bytes: &[u8], filename: &str) -> InputResult<ParseResult> {
    if filename.to_lowercase().ends_with(".csv") {
        parse_csv_bytes(bytes)
    } else {
        parse_excel_bytes(bytes)
    }
}

/// Parse a spreadsheet file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> InputResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    parse_upload(&bytes, name)
}

// =============================================================================
// Excel
// =============================================================================

/// Parse workbook bytes; rows come from the first sheet, row 0 is the header.
pub fn parse_excel_bytes(bytes: &[u8]) -> InputResult<ParseResult> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| InputParseError::Unreadable(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(InputParseError::EmptyWorkbook)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| InputParseError::Unreadable(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(InputParseError::NoHeaderRow)?;

    // Blank-header columns carry no name to key cells by, so they are ignored.
    let columns: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| {
            let name = cell_to_string(cell).trim().to_string();
            (!name.is_empty()).then_some(name)
        })
        .collect();

    let headers: Vec<String> = columns.iter().flatten().cloned().collect();
    if headers.is_empty() {
        return Err(InputParseError::NoHeaderRow);
    }

    let mut records = Vec::new();
    for row in rows {
        if let Some(obj) = build_record(&columns, |i| row.get(i).map(cell_to_string)) {
            records.push(obj);
        }
    }

    Ok(ParseResult {
        records,
        headers,
        sheet_name: Some(sheet_name),
        format: InputFormat::Excel,
    })
}

/// Render a cell to the string the operator saw in their spreadsheet.
///
/// Integral floats lose the trailing `.0`, dates come out ISO-formatted,
/// booleans use the Excel `TRUE`/`FALSE` convention, and error cells
/// (`#N/A`, `#DIV/0!`, ...) are treated as blank.
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_string(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => datetime_to_string(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn datetime_to_string(dt: &ExcelDateTime) -> String {
    match dt.as_datetime() {
        Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
            ndt.date().format("%Y-%m-%d").to_string()
        }
        Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Parse CSV bytes with encoding and delimiter auto-detection.
pub fn parse_csv_bytes(bytes: &[u8]) -> InputResult<ParseResult> {
    let content = decode_bytes(bytes);
    if content.trim().is_empty() {
        return Err(InputParseError::NoHeaderRow);
    }

    let delimiter = sniff_delimiter(&content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<Option<String>> = reader
        .headers()
        .map_err(|e| InputParseError::Unreadable(e.to_string()))?
        .iter()
        .map(|h| {
            let name = h.trim().to_string();
            (!name.is_empty()).then_some(name)
        })
        .collect();

    let headers: Vec<String> = columns.iter().flatten().cloned().collect();
    if headers.is_empty() {
        return Err(InputParseError::NoHeaderRow);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| InputParseError::Unreadable(e.to_string()))?;
        if let Some(obj) = build_record(&columns, |i| record.get(i).map(String::from)) {
            records.push(obj);
        }
    }

    Ok(ParseResult {
        records,
        headers,
        sheet_name: None,
        format: InputFormat::Csv,
    })
}

/// Decode raw bytes using chardet's guess, falling back to lossy UTF-8.
pub(crate) fn decode_bytes(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);
    match encoding_rs::Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Pick the delimiter with the most hits in the first line; comma when none hit.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    [b';', b',', b'\t', b'|']
        .into_iter()
        .map(|sep| (sep, first_line.bytes().filter(|&b| b == sep).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(_, count)| count)
        .map(|(sep, _)| sep)
        .unwrap_or(b',')
}

// =============================================================================
// Shared
// =============================================================================

/// Build one row object from named columns; `None` when every cell is blank.
fn build_record<F>(columns: &[Option<String>], cell_at: F) -> Option<Value>
where
    F: Fn(usize) -> Option<String>,
{
    let mut obj = Map::new();
    let mut all_blank = true;

    for (i, column) in columns.iter().enumerate() {
        let Some(name) = column else { continue };
        let value = cell_at(i).unwrap_or_default();
        if !value.is_empty() {
            all_blank = false;
        }
        obj.insert(name.clone(), Value::String(value));
    }

    (!all_blank).then_some(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "name;size\nHoodie;M\nTee;L";
        let result = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.format, InputFormat::Csv);
        assert_eq!(result.headers, vec!["name", "size"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["name"], "Hoodie");
        assert_eq!(result.records[1]["size"], "L");
    }

    #[test]
    fn test_csv_values_not_trimmed() {
        // Headers are trimmed, cell values stay verbatim.
        let csv = " name ,color\nHoodie, Red";
        let result = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.headers, vec!["name", "color"]);
        assert_eq!(result.records[0]["color"], " Red");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "a,b\n1,2\n,\n3,4\n";
        let result = parse_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_blank_header_column_ignored() {
        let csv = "sku,,color\nA1,junk,Red";
        let result = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.headers, vec!["sku", "color"]);
        let row = result.records[0].as_object().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row["color"], "Red");
    }

    #[test]
    fn test_empty_csv_is_error() {
        assert!(matches!(
            parse_csv_bytes(b""),
            Err(InputParseError::NoHeaderRow)
        ));
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c"), b'|');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn test_decode_latin1() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_bytes(bytes);
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(float_to_string(2.0), "2");
        assert_eq!(float_to_string(2.5), "2.5");
        assert_eq!(float_to_string(-10.0), "-10");
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("Red".into())), "Red");
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_excel_roundtrip() {
        // Craft a small workbook in memory and read it back.
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write(0, 0, "SKU").unwrap();
        sheet.write(0, 1, "Qty").unwrap();
        sheet.write(1, 0, "A1").unwrap();
        sheet.write(1, 1, 3.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let result = parse_excel_bytes(&bytes).unwrap();
        assert_eq!(result.format, InputFormat::Excel);
        assert_eq!(result.headers, vec!["SKU", "Qty"]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0]["SKU"], "A1");
        assert_eq!(result.records[0]["Qty"], "3");
    }

    #[test]
    fn test_not_a_workbook() {
        let result = parse_excel_bytes(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(InputParseError::Unreadable(_))));
    }
}
