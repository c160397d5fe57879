use crate::error::{json_kind, RowDefect, TableError};
use crate::table::convert::convert_cell;
use crate::table::types::{Row, Table, TypeDescriptor};
use serde_json::Value;
use tracing::{debug, trace};

/// Extract a typed table from a JSON array of same-width arrays.
///
/// Every row must be an array with exactly `columns.len()` elements, and
/// every cell must convert to the descriptor at its column. The first
/// defect aborts the extraction; no partial table is returned.
pub fn extract_table(root: &Value, columns: &[TypeDescriptor]) -> Result<Table, TableError> {
    TableExtractor::new(columns).extract(root)
}

/// Table extractor bound to one column type list
pub struct TableExtractor<'a> {
    columns: &'a [TypeDescriptor],
}

impl<'a> TableExtractor<'a> {
    pub fn new(columns: &'a [TypeDescriptor]) -> Self {
        TableExtractor { columns }
    }

    /// Extract the table, validating shape before converting any row's cells
    pub fn extract(&self, root: &Value) -> Result<Table, TableError> {
        let Value::Array(rows) = root else {
            return Err(TableError::TableNotFound {
                found: json_kind(root),
            });
        };

        debug!(rows = rows.len(), columns = self.columns.len(), "extracting table");

        let mut table = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            table.push(self.extract_row(index, row)?);
        }

        Ok(Table::new(self.columns.len(), table))
    }

    fn extract_row(&self, index: usize, row: &Value) -> Result<Row, TableError> {
        let Value::Array(cells) = row else {
            return Err(TableError::ImproperRow {
                index,
                defect: RowDefect::NotAnArray,
            });
        };

        if cells.len() != self.columns.len() {
            return Err(TableError::ImproperRow {
                index,
                defect: RowDefect::WidthMismatch {
                    expected: self.columns.len(),
                    actual: cells.len(),
                },
            });
        }

        trace!(row = index, "converting row");

        cells
            .iter()
            .zip(self.columns)
            .enumerate()
            .map(|(column, (cell, descriptor))| {
                convert_cell(cell, descriptor).map_err(|cause| TableError::CellConversionFailed {
                    row: index,
                    column,
                    raw_value: cell.to_string(),
                    target_type: descriptor.name(),
                    cause,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::table::types::{Cell, ScalarKind};
    use serde_json::json;

    fn int() -> TypeDescriptor {
        TypeDescriptor::Scalar(ScalarKind::Int)
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::Scalar(ScalarKind::String)
    }

    #[test]
    fn test_basic_table() {
        let root = json!([[1, "string1", 322], [2, "string2", 32433]]);
        let table = extract_table(&root, &[int(), string(), int()]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), 3);
        assert_eq!(
            table.rows(),
            &[
                vec![Cell::Int(1), Cell::from("string1"), Cell::Int(322)],
                vec![Cell::Int(2), Cell::from("string2"), Cell::Int(32433)],
            ]
        );
    }

    #[test]
    fn test_nullable_column() {
        let root = json!([[1, "string1", 322], [2, "string2", null]]);
        let columns = [int(), string(), TypeDescriptor::Nullable(ScalarKind::Int)];
        let table = extract_table(&root, &columns).unwrap();

        assert_eq!(table.get(0, 2), Some(&Cell::Int(322)));
        assert_eq!(table.get(1, 2), Some(&Cell::Null));
    }

    #[test]
    fn test_list_column() {
        let root = json!([[[12, 3, 4, 5], "string1", 322], [[], "string2", 834]]);
        let columns = [TypeDescriptor::list(int()), string(), int()];
        let table = extract_table(&root, &columns).unwrap();

        assert_eq!(table.get(0, 0), Some(&Cell::from(vec![12i32, 3, 4, 5])));
        assert_eq!(table.get(1, 0), Some(&Cell::List(vec![])));
    }

    #[test]
    fn test_empty_table() {
        let table = extract_table(&json!([]), &[int()]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), 1);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let root = json!([[1, ["a", "b"]], [2, []]]);
        let columns = [int(), TypeDescriptor::list(string())];
        assert_eq!(
            extract_table(&root, &columns).unwrap(),
            extract_table(&root, &columns).unwrap()
        );
    }

    #[test]
    fn test_root_must_be_array() {
        for root in [json!({"a": 1}), json!(3), json!("x"), json!(null)] {
            let err = extract_table(&root, &[int()]).unwrap_err();
            assert!(matches!(err, TableError::TableNotFound { .. }));
        }
    }

    #[test]
    fn test_row_must_be_array() {
        let root = json!([[1], {"a": 1}]);
        let err = extract_table(&root, &[int()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ImproperRow { index: 1, defect: RowDefect::NotAnArray }
        ));
    }

    #[test]
    fn test_width_mismatch() {
        let root = json!([[1, "a"], [2, "b"], [3]]);
        let err = extract_table(&root, &[int(), string()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ImproperRow {
                index: 2,
                defect: RowDefect::WidthMismatch { expected: 2, actual: 1 }
            }
        ));

        let root = json!([[1, "a", true]]);
        let err = extract_table(&root, &[int(), string()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ImproperRow {
                index: 0,
                defect: RowDefect::WidthMismatch { expected: 2, actual: 3 }
            }
        ));
    }

    #[test]
    fn test_conversion_failure_reports_cell() {
        // target type must come from the column, not the row
        let root = json!([[1, "a"], [2, "b"], [3, "c"], [4, 5.5]]);
        let columns = [int(), TypeDescriptor::Scalar(ScalarKind::Bool)];
        let err = extract_table(&root, &columns).unwrap_err();

        match err {
            TableError::CellConversionFailed {
                row,
                column,
                raw_value,
                target_type,
                cause,
            } => {
                assert_eq!(row, 0);
                assert_eq!(column, 1);
                assert_eq!(raw_value, "\"a\"");
                assert_eq!(target_type, "bool");
                assert!(matches!(cause, ConversionError::Unparseable { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
