//! # json-section - typed tables from JSON
//!
//! Loads strongly-typed tabular data embedded in JSON documents, so test
//! and configuration data can live in JSON files without a bespoke parser
//! for every shape.
//!
//! ## Modules
//!
//! - **table**: convert a JSON array of arrays into typed rows, and project
//!   rows into user objects through a factory closure
//! - **section**: locate JSON files by name and navigate to the section
//!   holding a table
//!
//! ## Quick Start
//!
//! ### Typed tables
//!
//! ```rust
//! use json_section::{extract_table, Cell, ScalarKind, TypeDescriptor};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = json!([[1, "string1", 322], [2, "string2", null]]);
//!
//! let columns = [
//!     TypeDescriptor::Scalar(ScalarKind::Int),
//!     TypeDescriptor::Scalar(ScalarKind::String),
//!     TypeDescriptor::Nullable(ScalarKind::Int),
//! ];
//! let table = extract_table(&data, &columns)?;
//!
//! assert_eq!(table.get(1, 2), Some(&Cell::Null));
//! # Ok(())
//! # }
//! ```
//!
//! ### Object lists
//!
//! ```rust
//! use json_section::get_object_list;
//! use serde_json::json;
//!
//! #[derive(Debug, PartialEq)]
//! struct Record {
//!     n: i32,
//!     s: String,
//! }
//!
//! let data = json!([[1, "a"], [2, "b"]]);
//! let records = get_object_list(&data, |n: i32, s: String| Record { n, s }).unwrap();
//!
//! assert_eq!(records[1], Record { n: 2, s: "b".to_string() });
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

pub mod error;
pub mod section;
pub mod table;

// Re-export commonly used types for convenience
pub use error::{ConversionError, RowDefect, SectionError, TableError};
pub use section::{JsonDocument, JsonSection, ReaderConfig, SectionPath, SectionReader};
pub use table::{
    extract_table, get_object_list, project, Cell, Column, Row, RowFactory, ScalarKind, Table,
    TypeDescriptor,
};

/// Main entry point: parse a JSON stream and read the table at `path`
pub fn read_table<R: Read>(reader: R, path: &str, columns: &[TypeDescriptor]) -> Result<Table> {
    let document: Value = serde_json::from_reader(reader).context("Failed to parse JSON")?;

    let section = JsonSection::new(&document)
        .section(path)
        .with_context(|| format!("Failed to locate section {:?}", path))?;

    section
        .get_table(columns)
        .with_context(|| format!("Failed to read table at {:?}", path))
}
