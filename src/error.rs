//! Error types for the SKU template conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`MappingLoadError`] - mapping table file errors
//! - [`InvalidMappingError`] - structurally invalid mapping tables
//! - [`InputParseError`] - uploaded spreadsheet errors
//! - [`OutputError`] - workbook serialization errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Mapping Table Load Errors
// =============================================================================

/// Errors while loading the automation mapping table.
#[derive(Debug, Error)]
pub enum MappingLoadError {
    /// Failed to read the mapping file.
    #[error("Failed to read mapping file: {0}")]
    IoError(#[from] std::io::Error),

    /// The mapping file is not a readable workbook or CSV table.
    #[error("Mapping file is unreadable: {0}")]
    Unreadable(String),

    /// The workbook exists but contains no sheets.
    #[error("Mapping workbook contains no sheets")]
    NoSheet,

    /// The table parsed but yielded no usable mapping rows.
    #[error("Mapping table contains no usable rows")]
    NoEntries,
}

// =============================================================================
// Invalid Mapping Errors
// =============================================================================

/// Structural errors in a loaded mapping.
///
/// The loader already guarantees unique source names, so these cover
/// what remains: the target side of the table.
#[derive(Debug, Error)]
pub enum InvalidMappingError {
    /// Two source columns map to the same target attribute.
    #[error("Duplicate target attribute '{target}' (from '{first_source}' and '{second_source}')")]
    DuplicateTarget {
        target: String,
        first_source: String,
        second_source: String,
    },

    /// The mapping has no entries, so the template would have no columns.
    #[error("Mapping is empty")]
    Empty,
}

// =============================================================================
// Input Parse Errors
// =============================================================================

/// Errors while parsing an uploaded spreadsheet.
#[derive(Debug, Error)]
pub enum InputParseError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The bytes are not a readable spreadsheet.
    #[error("Not a readable spreadsheet: {0}")]
    Unreadable(String),

    /// The workbook opened but contains no sheets.
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// The first sheet has no header row.
    #[error("No header row found in sheet")]
    NoHeaderRow,
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while serializing the output workbook.
#[derive(Debug, Error)]
pub enum OutputError {
    /// xlsx serialization failed.
    #[error("Failed to write workbook: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::convert_bytes`].
/// A conversion either fully succeeds or fails with one of these; there is
/// no partial output.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Mapping table could not be loaded.
    #[error("Mapping error: {0}")]
    MappingLoad(#[from] MappingLoadError),

    /// Mapping table is structurally invalid.
    #[error("Invalid mapping: {0}")]
    InvalidMapping(#[from] InvalidMappingError),

    /// Uploaded spreadsheet could not be parsed.
    #[error("Input error: {0}")]
    InputParse(#[from] InputParseError),

    /// Output workbook could not be produced.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// IO error outside the concerns above.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for mapping load operations.
pub type MappingResult<T> = Result<T, MappingLoadError>;

/// Result type for input parsing operations.
pub type InputResult<T> = Result<T, InputParseError>;

/// Result type for output serialization.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
