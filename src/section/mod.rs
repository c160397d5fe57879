//! JSON documents and the sections inside them
//!
//! Resources are located by file name under configured roots, parsed once,
//! and navigated with dotted paths down to the value holding a table.

pub mod document;
pub mod path;
pub mod reader;

pub use document::JsonSection;
pub use path::{PathToken, SectionPath};
pub use reader::{JsonDocument, ReaderConfig, SectionReader};
