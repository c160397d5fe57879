use crate::error::{SectionError, TableError};
use crate::section::path::{PathToken, SectionPath};
use crate::table::{extract_table, get_object_list, RowFactory, Table, TypeDescriptor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

/// A sub-tree of a parsed JSON document
#[derive(Debug, Clone, Copy)]
pub struct JsonSection<'a> {
    value: &'a Value,
}

impl<'a> JsonSection<'a> {
    pub fn new(value: &'a Value) -> Self {
        JsonSection { value }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Navigate to a nested section, e.g. `tables.basicData` or `rows[3]`
    pub fn section(&self, path: &str) -> Result<JsonSection<'a>, SectionError> {
        let path: SectionPath = path.parse()?;
        self.section_at(&path)
    }

    pub fn section_at(&self, path: &SectionPath) -> Result<JsonSection<'a>, SectionError> {
        let mut current = self.value;
        for (index, token) in path.tokens().iter().enumerate() {
            trace!(%token, index, "navigating section");
            current = match token {
                PathToken::Property(name) => current
                    .as_object()
                    .and_then(|obj| obj.get(name))
                    .ok_or_else(|| SectionError::PropertyNotFound {
                        token: name.clone(),
                        index,
                    })?,
                PathToken::Index(position) => current
                    .as_array()
                    .and_then(|arr| arr.get(*position))
                    .ok_or(SectionError::ArrayOutOfBound {
                        token: *position,
                        index,
                    })?,
            };
        }
        Ok(JsonSection { value: current })
    }

    /// Read this section as a typed table
    pub fn get_table(&self, columns: &[TypeDescriptor]) -> Result<Table, TableError> {
        extract_table(self.value, columns)
    }

    /// Read this section as a table and build one object per row
    pub fn get_object_list<Args, F>(&self, factory: F) -> Result<Vec<F::Output>, TableError>
    where
        F: RowFactory<Args>,
    {
        get_object_list(self.value, factory)
    }

    /// Bind the whole section to `T`
    pub fn get_object<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.value)
    }
}
