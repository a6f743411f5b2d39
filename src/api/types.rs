//! REST API types for frontend integration.
//!
//! The preview endpoint returns the Type-tab summary directly so the
//! frontend can show the operator what the download will contain.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::TypeRow;
use crate::transform::pipeline::{Conversion, ConversionReport};

/// Response for `POST /api/preview`: everything about the conversion except
/// the workbook bytes themselves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// "ready" or "warning" (columns were dropped or missing).
    pub status: String,

    /// The Type tab: one entry per template attribute.
    pub attributes: Vec<TypeRow>,

    /// Column-level accounting for the upload.
    pub report: ConversionReport,
}

impl From<Conversion> for PreviewResponse {
    fn from(conversion: Conversion) -> Self {
        let clean = conversion.report.dropped_columns.is_empty()
            && conversion.report.missing_columns.is_empty();

        PreviewResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if clean { "ready" } else { "warning" }.to_string(),
            attributes: conversion.tables.types,
            report: conversion.report,
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;
    use crate::transform::pipeline::convert_bytes;

    fn mapping() -> FieldMapping {
        FieldMapping::from_pairs(vec![("ProdColor", "Option2"), ("SKU", "SKU")])
    }

    #[test]
    fn test_preview_status_ready() {
        let csv = "SKU,ProdColor\nA1,Red\n";
        let conversion = convert_bytes(csv.as_bytes(), "p.csv", &mapping()).unwrap();
        let preview = PreviewResponse::from(conversion);

        assert_eq!(preview.status, "ready");
        assert_eq!(preview.attributes.len(), 2);
        assert_eq!(preview.attributes[0].attribute, "Color");
        assert_eq!(preview.attributes[0].distinct_values, vec!["Red"]);
    }

    #[test]
    fn test_preview_status_warning_on_dropped_columns() {
        let csv = "SKU,ProdColor,Extra\nA1,Red,x\n";
        let conversion = convert_bytes(csv.as_bytes(), "p.csv", &mapping()).unwrap();
        let preview = PreviewResponse::from(conversion);

        assert_eq!(preview.status, "warning");
    }

    #[test]
    fn test_preview_serialization_camel_case() {
        let csv = "SKU,ProdColor\nA1,Red\n";
        let conversion = convert_bytes(csv.as_bytes(), "p.csv", &mapping()).unwrap();
        let json = serde_json::to_value(PreviewResponse::from(conversion)).unwrap();

        assert!(json.get("jobId").is_some());
        assert!(json["report"].get("rowCount").is_some());
        assert!(json["attributes"][0].get("sourceColumn").is_some());
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("no file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "no file provided");
    }
}
