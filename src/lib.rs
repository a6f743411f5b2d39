//! # Skumapper - product spreadsheets into the SKU template
//!
//! Skumapper reformats arbitrary product-data spreadsheets into the fixed
//! two-tab SKU template, driven by a static automation mapping table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Spreadsheet  │────▶│   Parser    │────▶│  Transform  │────▶│ SKU template │
//! │ (.xlsx/.csv) │     │ (rows+hdrs) │     │ (remap+sum) │     │ (Values+Type)│
//! └──────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//!                             ▲
//!                      ┌─────────────┐
//!                      │   Mapping   │  source column → target attribute
//!                      │  (loader)   │  (Option1→Size, Option2→Color)
//!                      └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skumapper::{convert_file, load_mapping_file};
//! use std::path::Path;
//!
//! let mapping = load_mapping_file("Mapping - Automation.xlsx").unwrap();
//! let conversion = convert_file(Path::new("products.xlsx"), &mapping).unwrap();
//! std::fs::write("sku-template.xlsx", &conversion.workbook).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - SKU template schema (tabs, reserved slots, TypeRow)
//! - [`mapping`] - FieldMapping and the automation-table loader
//! - [`parser`] - Spreadsheet parsing (Excel via calamine, CSV)
//! - [`transform`] - Remap, summary and the conversion pipeline
//! - [`writer`] - Two-tab xlsx output
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Mapping table
pub mod mapping;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    InputParseError,
    InvalidMappingError,
    MappingLoadError,
    OutputError,
    PipelineError,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    resolve_reserved_target,
    SkuTables,
    TypeRow,
    COLOR_ATTRIBUTE,
    OPTION1,
    OPTION2,
    SIZE_ATTRIBUTE,
    TYPE_TAB,
    VALUES_TAB,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{load_mapping_bytes, load_mapping_file, FieldMapping, MappingEntry};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{parse_file, parse_upload, InputFormat, ParseResult};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    convert_bytes,
    convert_file,
    transform,
    Conversion,
    ConversionReport,
};

// =============================================================================
// Re-exports - Writer
// =============================================================================

pub use writer::{write_workbook, write_workbook_file};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, PreviewResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
