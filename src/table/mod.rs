//! Typed table extraction
//!
//! Turns a JSON array of same-shaped arrays into rows of typed cells.
//! Column types are given as [`TypeDescriptor`]s; the extractor validates
//! the table's shape, converts every cell, and fails on the first defect
//! with the row and column of the offending value.

pub mod binder;
pub mod convert;
pub mod extractor;
pub mod project;
pub mod types;

pub use binder::{Binder, BoundValue};
pub use convert::convert_cell;
pub use extractor::{extract_table, TableExtractor};
pub use project::{get_object_list, project, Column, RowFactory};
pub use types::{Cell, Row, ScalarKind, Table, TypeDescriptor, UnknownType};
