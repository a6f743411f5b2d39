//! Serialize the (Values, Type) pair into the two-tab SKU template workbook.
//!
//! Tab layout is fixed:
//! - `Values`: header row = target attributes in mapping order, then one row
//!   per input row.
//! - `Type`: `Attribute | Source Column | Distinct Values` header, one row
//!   per attribute; distinct values are appended one per cell from the third
//!   column onward.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

use crate::error::{OutputError, OutputResult};
use crate::models::{SkuTables, TYPE_TAB, TYPE_TAB_HEADERS, VALUES_TAB};

/// Serialize the tables into xlsx bytes, ready for download.
pub fn write_workbook(tables: &SkuTables) -> OutputResult<Vec<u8>> {
    let mut workbook = build_workbook(tables)?;
    Ok(workbook.save_to_buffer()?)
}

/// Serialize the tables into an xlsx file on disk.
pub fn write_workbook_file<P: AsRef<Path>>(tables: &SkuTables, path: P) -> OutputResult<()> {
    let mut workbook = build_workbook(tables)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

fn build_workbook(tables: &SkuTables) -> Result<Workbook, OutputError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    write_values_tab(workbook.add_worksheet(), tables, &header_format)?;
    write_type_tab(workbook.add_worksheet(), tables, &header_format)?;

    Ok(workbook)
}

fn write_values_tab(
    sheet: &mut Worksheet,
    tables: &SkuTables,
    header_format: &Format,
) -> Result<(), OutputError> {
    sheet.set_name(VALUES_TAB)?;

    let attributes = tables.attribute_order();
    for (col, attribute) in attributes.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *attribute, header_format)?;
    }

    for (row_idx, row) in tables.values.iter().enumerate() {
        for (col, attribute) in attributes.iter().enumerate() {
            let value = row.get(*attribute).and_then(|v| v.as_str()).unwrap_or("");
            sheet.write((row_idx + 1) as u32, col as u16, value)?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_type_tab(
    sheet: &mut Worksheet,
    tables: &SkuTables,
    header_format: &Format,
) -> Result<(), OutputError> {
    sheet.set_name(TYPE_TAB)?;

    for (col, header) in TYPE_TAB_HEADERS.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *header, header_format)?;
    }

    for (row_idx, type_row) in tables.types.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        sheet.write(row, 0, type_row.attribute.as_str())?;
        sheet.write(row, 1, type_row.source_column.as_str())?;
        for (i, value) in type_row.distinct_values.iter().enumerate() {
            sheet.write(row, (2 + i) as u16, value.as_str())?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;
    use crate::parser::parse_excel_bytes;
    use crate::transform::transform;
    use serde_json::json;

    fn sample_tables() -> SkuTables {
        let mapping = FieldMapping::from_pairs(vec![
            ("ProdColor", "Option2"),
            ("ProdSize", "Option1"),
            ("SKU", "SKU"),
        ]);
        let rows = vec![
            json!({"ProdColor": "Red", "ProdSize": "M", "SKU": "A1"}),
            json!({"ProdColor": "Red", "ProdSize": "L", "SKU": "A2"}),
        ];
        transform(&rows, &mapping).unwrap()
    }

    #[test]
    fn test_workbook_bytes_are_xlsx() {
        let bytes = write_workbook(&sample_tables()).unwrap();
        // xlsx is a zip container
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_values_tab_round_trip() {
        let bytes = write_workbook(&sample_tables()).unwrap();

        // The Values tab is the first sheet, so the upload parser can read
        // our own output back.
        let parsed = parse_excel_bytes(&bytes).unwrap();
        assert_eq!(parsed.sheet_name.as_deref(), Some(VALUES_TAB));
        assert_eq!(parsed.headers, vec!["Color", "Size", "SKU"]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0]["Color"], "Red");
        assert_eq!(parsed.records[1]["Size"], "L");
    }

    #[test]
    fn test_workbook_file_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        write_workbook_file(&sample_tables(), &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_empty_values_still_writes_headers() {
        let mapping = FieldMapping::from_pairs(vec![("SKU", "SKU")]);
        let tables = transform(&[], &mapping).unwrap();
        let bytes = write_workbook(&tables).unwrap();

        let parsed = parse_excel_bytes(&bytes).unwrap();
        assert_eq!(parsed.headers, vec!["SKU"]);
        assert!(parsed.records.is_empty());
    }
}
