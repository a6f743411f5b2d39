//! The automation mapping table: source column name → target attribute.
//!
//! The mapping drives the whole conversion. It is loaded once from the
//! static automation workbook (or a CSV export of it), normalized, and then
//! treated as immutable. Iteration order is the row order of first
//! appearance, which later defines the Values tab column order.

use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;
use std::path::Path;

use crate::error::{InvalidMappingError, MappingLoadError, MappingResult};
use crate::models::resolve_reserved_target;
use crate::parser::{cell_to_string, decode_bytes, sniff_delimiter};

// =============================================================================
// Field Mapping
// =============================================================================

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    /// Column name as it appears in uploaded spreadsheets.
    pub source: String,
    /// Attribute name in the SKU template.
    pub target: String,
}

/// Ordered mapping from source column name to target attribute.
///
/// Guarantees after construction:
/// - source names are unique (last occurrence wins, first position kept)
/// - reserved targets are already resolved (`Option1` → `Size`,
///   `Option2` → `Color`)
/// - entries with a blank source or target never make it in
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    entries: Vec<MappingEntry>,
}

impl FieldMapping {
    /// Build a mapping from raw (source, target) pairs.
    ///
    /// Applies the construction guarantees above; callers hand in table rows
    /// as-is and get back the normalized mapping.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut entries: Vec<MappingEntry> = Vec::new();

        for (source, target) in pairs {
            let source = source.into().trim().to_string();
            let target = target.into().trim().to_string();
            if source.is_empty() || target.is_empty() {
                continue;
            }
            let target = resolve_reserved_target(&target).to_string();

            match entries.iter().position(|e| e.source == source) {
                // Duplicate source: last occurrence wins, position stays.
                Some(pos) => entries[pos].target = target,
                None => entries.push(MappingEntry { source, target }),
            }
        }

        Self { entries }
    }

    /// Entries in iteration order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target attribute for a source column, if mapped.
    pub fn target_for(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.target.as_str())
    }

    /// Target attributes in iteration order.
    pub fn targets(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.target.as_str()).collect()
    }

    /// Source column names in iteration order.
    pub fn sources(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.source.as_str()).collect()
    }

    /// Check structural validity: a non-empty table with unique targets.
    ///
    /// Unique sources are already guaranteed by construction; duplicate
    /// targets would collapse two template columns into one, so they are
    /// rejected rather than silently merged.
    pub fn validate(&self) -> Result<(), InvalidMappingError> {
        if self.entries.is_empty() {
            return Err(InvalidMappingError::Empty);
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if let Some(dup) = self.entries[..i].iter().find(|e| e.target == entry.target) {
                return Err(InvalidMappingError::DuplicateTarget {
                    target: entry.target.clone(),
                    first_source: dup.source.clone(),
                    second_source: entry.source.clone(),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Load the mapping table from a file, choosing the reader by extension.
pub fn load_mapping_file<P: AsRef<Path>>(path: P) -> MappingResult<FieldMapping> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_mapping_bytes(&bytes, name)
}

/// Load the mapping table from raw bytes.
///
/// The first row of the table is a header row and is skipped; every
/// following row contributes (column A, column B) as a (source, target)
/// pair. Rows with a blank source or target are skipped silently.
pub fn load_mapping_bytes(bytes: &[u8], filename: &str) -> MappingResult<FieldMapping> {
    let mapping = if filename.to_lowercase().ends_with(".csv") {
        load_mapping_csv(bytes)?
    } else {
        load_mapping_excel(bytes)?
    };

    if mapping.is_empty() {
        return Err(MappingLoadError::NoEntries);
    }
    Ok(mapping)
}

fn load_mapping_excel(bytes: &[u8]) -> MappingResult<FieldMapping> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MappingLoadError::Unreadable(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(MappingLoadError::NoSheet)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| MappingLoadError::Unreadable(e.to_string()))?;

    let pairs = range.rows().skip(1).map(|row| {
        let source = row.first().map(cell_to_string).unwrap_or_default();
        let target = row.get(1).map(cell_to_string).unwrap_or_default();
        (source, target)
    });

    Ok(FieldMapping::from_pairs(pairs))
}

fn load_mapping_csv(bytes: &[u8]) -> MappingResult<FieldMapping> {
    let content = decode_bytes(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content))
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut pairs = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| MappingLoadError::Unreadable(e.to_string()))?;
        let source = record.get(0).unwrap_or_default().to_string();
        let target = record.get(1).unwrap_or_default().to_string();
        pairs.push((source, target));
    }

    Ok(FieldMapping::from_pairs(pairs))
}
