//! Re-key input rows through the field mapping.
//!
//! This is the lossy half of the conversion: every mapping target gets a
//! cell (blank when the source column is absent), and every input column
//! without a mapping entry is dropped. The template defines the output
//! shape, not the upload.

use serde_json::{Map, Value};

use crate::mapping::FieldMapping;

/// Build the ValuesTable: one output row per input row, same order.
pub fn remap_rows(rows: &[Value], mapping: &FieldMapping) -> Vec<Value> {
    rows.iter().map(|row| remap_row(row, mapping)).collect()
}

/// Re-key a single row. Output keys are exactly the mapping targets.
fn remap_row(row: &Value, mapping: &FieldMapping) -> Value {
    let cells = row.as_object();
    let mut out = Map::new();

    for entry in mapping.entries() {
        let value = cells
            .and_then(|c| c.get(&entry.source))
            .map(scalar_to_string)
            .unwrap_or_default();
        out.insert(entry.target.clone(), Value::String(value));
    }

    Value::Object(out)
}

/// Render a scalar cell value; null becomes blank, non-strings keep their
/// JSON rendering.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
