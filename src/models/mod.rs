//! Domain models for the SKU template.
//!
//! This module pins down the fixed output schema every conversion produces:
//!
//! - [`TypeRow`] - one schema-summary row per mapped attribute
//! - [`SkuTables`] - the (Values, Type) tab pair
//! - Reserved attribute slots ([`OPTION1`]/[`OPTION2`]) and their required
//!   resolutions ([`SIZE_ATTRIBUTE`]/[`COLOR_ATTRIBUTE`])

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Template Constants
// =============================================================================

/// Name of the row-level output tab.
pub const VALUES_TAB: &str = "Values";

/// Name of the schema-summary output tab.
pub const TYPE_TAB: &str = "Type";

/// Header row of the Type tab. Distinct values are appended in their own
/// cells to the right of the third column.
pub const TYPE_TAB_HEADERS: [&str; 3] = ["Attribute", "Source Column", "Distinct Values"];

/// Reserved target slot that must always resolve to [`SIZE_ATTRIBUTE`].
pub const OPTION1: &str = "Option1";

/// Reserved target slot that must always resolve to [`COLOR_ATTRIBUTE`].
pub const OPTION2: &str = "Option2";

/// Attribute the `Option1` slot resolves to.
pub const SIZE_ATTRIBUTE: &str = "Size";

/// Attribute the `Option2` slot resolves to.
pub const COLOR_ATTRIBUTE: &str = "Color";

/// Resolve a raw target attribute through the reserved-slot rule.
///
/// `Option1` and `Option2` are normalized to `Size` and `Color`
/// unconditionally; every other target passes through untouched. This is a
/// normalization rule, not validation - the raw mapping file is never trusted
/// for these two slots.
pub fn resolve_reserved_target(target: &str) -> &str {
    match target {
        OPTION1 => SIZE_ATTRIBUTE,
        OPTION2 => COLOR_ATTRIBUTE,
        other => other,
    }
}

// =============================================================================
// Type Tab Rows
// =============================================================================

/// One row of the Type tab: a mapped attribute, the source column it came
/// from, and the distinct non-blank values observed in its Values column.
///
/// Distinct values keep first-occurrence order and are deduplicated by exact
/// string equality - case-sensitive, untrimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRow {
    /// Target attribute name (Values tab column header).
    pub attribute: String,
    /// Source column the attribute was mapped from.
    pub source_column: String,
    /// Ordered set of distinct non-blank values.
    pub distinct_values: Vec<String>,
}

// =============================================================================
// Output Tables
// =============================================================================

/// The two output tables of a conversion.
///
/// `values` holds one JSON object per input row, keyed by target attribute.
/// `types` holds one [`TypeRow`] per mapping entry, in mapping order - which
/// also defines the Values tab column order.
#[derive(Debug, Clone, Serialize)]
pub struct SkuTables {
    /// Row-level output, one object per input row.
    pub values: Vec<Value>,
    /// Schema summary, one row per mapped attribute.
    pub types: Vec<TypeRow>,
}

impl SkuTables {
    /// Column order of the Values tab: attributes in mapping order.
    pub fn attribute_order(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.attribute.as_str()).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
