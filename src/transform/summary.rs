//! Build the Type tab: distinct values observed per attribute.
//!
//! Runs over the finished ValuesTable, one pass per mapping entry. Blanks
//! never count as a value; everything else is deduplicated by exact string
//! equality (case-sensitive, untrimmed) in first-occurrence order.

use serde_json::Value;
use std::collections::HashSet;

use crate::mapping::FieldMapping;
use crate::models::TypeRow;

/// Build the TypeTable: one row per mapping entry, mapping order.
pub fn summarize(values: &[Value], mapping: &FieldMapping) -> Vec<TypeRow> {
    mapping
        .entries()
        .iter()
        .map(|entry| TypeRow {
            attribute: entry.target.clone(),
            source_column: entry.source.clone(),
            distinct_values: distinct_column_values(values, &entry.target),
        })
        .collect()
}

/// Ordered set of distinct non-blank values in one attribute's column.
fn distinct_column_values(values: &[Value], attribute: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();

    for row in values {
        let Some(value) = row.get(attribute).and_then(|v| v.as_str()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            distinct.push(value.to_string());
        }
    }

    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn color_rows(colors: &[&str]) -> Vec<Value> {
        colors.iter().map(|c| json!({ "Color": c })).collect()
    }

    fn color_mapping() -> FieldMapping {
        FieldMapping::from_pairs(vec![("ProdColor", "Color")])
    }

    #[test]
    fn test_distinct_first_occurrence_order() {
        let rows = color_rows(&["Red", "Blue", "Red", ""]);
        let types = summarize(&rows, &color_mapping());

        assert_eq!(types.len(), 1);
        assert_eq!(types[0].attribute, "Color");
        assert_eq!(types[0].source_column, "ProdColor");
        assert_eq!(types[0].distinct_values, vec!["Red", "Blue"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive_and_untrimmed() {
        let rows = color_rows(&["Red", "red", "Red ", "Red"]);
        let types = summarize(&rows, &color_mapping());
        assert_eq!(types[0].distinct_values, vec!["Red", "red", "Red "]);
    }

    #[test]
    fn test_all_blank_column_yields_empty_set() {
        let rows = color_rows(&["", "", ""]);
        let types = summarize(&rows, &color_mapping());
        assert!(types[0].distinct_values.is_empty());
    }

    #[test]
    fn test_empty_values_still_one_row_per_attribute() {
        let mapping = FieldMapping::from_pairs(vec![
            ("ProdColor", "Color"),
            ("SKU", "SKU"),
        ]);
        let types = summarize(&[], &mapping);

        assert_eq!(types.len(), 2);
        assert!(types.iter().all(|t| t.distinct_values.is_empty()));
    }
}
