//! Error types for table extraction and section navigation

use std::path::PathBuf;
use thiserror::Error;

/// Why a row of the table could not be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDefect {
    /// The row element is not a JSON array
    NotAnArray,
    /// The row has a different number of cells than there are column types
    WidthMismatch { expected: usize, actual: usize },
}

/// Failure to convert a single JSON value into its requested type
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: &'static str },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: String },

    #[error("cannot parse {value:?} as {target}")]
    Unparseable { value: String, target: String },

    #[error("null is not a valid {target}")]
    UnexpectedNull { target: String },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ConversionError>,
    },

    #[error("cannot bind to {target}: {source}")]
    Binding {
        target: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the table extractor
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table not found: value is {found}, not an array")]
    TableNotFound { found: &'static str },

    #[error("improper row at index {index}: {}", describe_defect(.defect))]
    ImproperRow { index: usize, defect: RowDefect },

    #[error("unable to convert cell at row {row}, column {column} ({raw_value}) to {target_type}")]
    CellConversionFailed {
        row: usize,
        column: usize,
        raw_value: String,
        target_type: String,
        #[source]
        cause: ConversionError,
    },
}

impl TableError {
    /// Row index the error points at, if any
    pub fn row(&self) -> Option<usize> {
        match self {
            TableError::TableNotFound { .. } => None,
            TableError::ImproperRow { index, .. } => Some(*index),
            TableError::CellConversionFailed { row, .. } => Some(*row),
        }
    }
}

fn describe_defect(defect: &RowDefect) -> String {
    match defect {
        RowDefect::NotAnArray => "row is not an array".to_string(),
        RowDefect::WidthMismatch { expected, actual } => {
            format!("expected {} columns, found {}", expected, actual)
        }
    }
}

/// Errors raised while locating a section inside a document
#[derive(Debug, Error)]
pub enum SectionError {
    #[error("invalid section path {path:?}")]
    InvalidPath { path: String },

    #[error("token {token} at the index {index} caused property not found")]
    PropertyNotFound { token: String, index: usize },

    #[error("token {token} at the index {index} caused array out of bound")]
    ArrayOutOfBound { token: usize, index: usize },

    #[error("resource {name} not found under {roots:?}")]
    ResourceNotFound { name: String, roots: Vec<PathBuf> },

    #[error("multiple file with name {name} found : {files}")]
    MultipleResourceFound { name: String, files: String },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Short name of a JSON value's kind, used in error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
