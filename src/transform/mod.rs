//! Transformation module.
//!
//! This module turns parsed input rows into the two SKU template tables:
//! - Remap: re-key rows through the field mapping (Values tab)
//! - Summary: distinct values per attribute (Type tab)
//! - Pipeline: parse → transform → write orchestration

pub mod pipeline;
pub mod remap;
pub mod summary;

use serde_json::Value;

use crate::error::InvalidMappingError;
use crate::mapping::FieldMapping;
use crate::models::SkuTables;

pub use pipeline::*;

/// Transform input rows into the (Values, Type) table pair.
///
/// Pure and total over any well-formed input: the only failure mode is a
/// structurally invalid mapping. Output row *i* always corresponds to input
/// row *i*, and the Type tab always has one row per mapping entry, even for
/// zero input rows.
pub fn transform(
    rows: &[Value],
    mapping: &FieldMapping,
) -> Result<SkuTables, InvalidMappingError> {
    mapping.validate()?;

    let values = remap::remap_rows(rows, mapping);
    let types = summary::summarize(&values, mapping);

    Ok(SkuTables { values, types })
}
