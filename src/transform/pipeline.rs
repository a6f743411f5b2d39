//! High-level pipeline API: parse → transform → write.
//!
//! This is the one upload→download request, as a function. It reports
//! progress through the log broadcaster and returns the finished workbook
//! bytes together with a report the API can show the operator.
//!
//! # Example
//!
//! ```rust,ignore
//! use skumapper::{convert_file, load_mapping_file};
//! use std::path::Path;
//!
//! let mapping = load_mapping_file("Mapping - Automation.xlsx")?;
//! let conversion = convert_file(Path::new("products.xlsx"), &mapping)?;
//! std::fs::write("sku-template.xlsx", &conversion.workbook)?;
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::mapping::FieldMapping;
use crate::models::SkuTables;
use crate::parser::{parse_upload, ParseResult};
use crate::transform::transform;
use crate::writer::write_workbook;

/// Result of a complete conversion.
pub struct Conversion {
    /// The finished two-tab workbook, ready for download.
    pub workbook: Vec<u8>,
    /// The tables that went into it, for previews.
    pub tables: SkuTables,
    /// What happened to the upload's columns.
    pub report: ConversionReport,
}

/// Column-level accounting for one conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    /// Input rows converted.
    pub row_count: usize,
    /// Template attributes produced.
    pub attribute_count: usize,
    /// Detected input format.
    pub format: String,
    /// Sheet the rows came from (Excel only).
    pub sheet_name: Option<String>,
    /// Upload columns that made it into the template.
    pub mapped_columns: Vec<String>,
    /// Upload columns with no mapping entry, dropped.
    pub dropped_columns: Vec<String>,
    /// Mapping sources absent from the upload; their attributes stay blank.
    pub missing_columns: Vec<String>,
}

/// Convert uploaded bytes into the SKU template workbook.
pub fn convert_bytes(
    bytes: &[u8],
    filename: &str,
    mapping: &FieldMapping,
) -> PipelineResult<Conversion> {
    log_info(format!("Reading upload: {} ({} bytes)", filename, bytes.len()));

    let parsed = parse_upload(bytes, filename)?;
    log_success(format!(
        "Read {} rows, {} columns ({})",
        parsed.records.len(),
        parsed.headers.len(),
        parsed.format
    ));

    let report = build_report(&parsed, mapping);
    if !report.dropped_columns.is_empty() {
        log_warning(format!(
            "{} unmapped column(s) dropped: {}",
            report.dropped_columns.len(),
            report.dropped_columns.join(", ")
        ));
    }
    if !report.missing_columns.is_empty() {
        log_warning(format!(
            "{} mapped column(s) missing from upload, left blank: {}",
            report.missing_columns.len(),
            report.missing_columns.join(", ")
        ));
    }

    let tables = transform(&parsed.records, mapping)?;
    log_success(format!(
        "Remapped {} rows into {} attributes",
        tables.values.len(),
        tables.types.len()
    ));

    let workbook = write_workbook(&tables)?;
    log_success(format!("Workbook ready ({} bytes)", workbook.len()));

    Ok(Conversion {
        workbook,
        tables,
        report,
    })
}

/// Convert a spreadsheet file from disk.
pub fn convert_file(path: &Path, mapping: &FieldMapping) -> PipelineResult<Conversion> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    convert_bytes(&bytes, name, mapping)
}

fn build_report(parsed: &ParseResult, mapping: &FieldMapping) -> ConversionReport {
    let (mapped_columns, dropped_columns): (Vec<String>, Vec<String>) = parsed
        .headers
        .iter()
        .cloned()
        .partition(|h| mapping.target_for(h).is_some());

    let missing_columns = mapping
        .sources()
        .into_iter()
        .filter(|s| !parsed.headers.iter().any(|h| h == s))
        .map(String::from)
        .collect();

    ConversionReport {
        row_count: parsed.records.len(),
        attribute_count: mapping.len(),
        format: parsed.format.to_string(),
        sheet_name: parsed.sheet_name.clone(),
        mapped_columns,
        dropped_columns,
        missing_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::parser::parse_excel_bytes;

    fn mapping() -> FieldMapping {
        FieldMapping::from_pairs(vec![
            ("ProdColor", "Option2"),
            ("ProdSize", "Option1"),
            ("SKU", "SKU"),
            ("Weight", "Weight"),
        ])
    }

    #[test]
    fn test_convert_csv_end_to_end() {
        let csv = "SKU,ProdColor,ProdSize,Extra\nA1,Red,M,x\nA2,Red,L,y\n";
        let conversion = convert_bytes(csv.as_bytes(), "products.csv", &mapping()).unwrap();

        // Download parses back as the Values tab.
        let parsed = parse_excel_bytes(&conversion.workbook).unwrap();
        assert_eq!(parsed.headers, vec!["Color", "Size", "SKU", "Weight"]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0]["Color"], "Red");
        assert_eq!(parsed.records[0]["SKU"], "A1");

        // Weight was mapped but absent: present and blank in every row.
        assert_eq!(parsed.records[0]["Weight"], "");
    }

    #[test]
    fn test_report_column_accounting() {
        let csv = "SKU,ProdColor,Extra\nA1,Red,x\n";
        let conversion = convert_bytes(csv.as_bytes(), "products.csv", &mapping()).unwrap();
        let report = &conversion.report;

        assert_eq!(report.row_count, 1);
        assert_eq!(report.attribute_count, 4);
        assert_eq!(report.format, "CSV");
        assert_eq!(report.mapped_columns, vec!["SKU", "ProdColor"]);
        assert_eq!(report.dropped_columns, vec!["Extra"]);
        assert_eq!(report.missing_columns, vec!["ProdSize", "Weight"]);
    }

    #[test]
    fn test_unreadable_upload_fails_whole_request() {
        let result = convert_bytes(b"garbage", "products.xlsx", &mapping());
        assert!(matches!(result, Err(PipelineError::InputParse(_))));
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(&path, "SKU,ProdSize\nA1,M\n").unwrap();

        let conversion = convert_file(&path, &mapping()).unwrap();
        assert_eq!(conversion.tables.values.len(), 1);
        assert!(conversion.workbook.starts_with(b"PK"));
    }
}
