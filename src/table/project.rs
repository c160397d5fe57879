//! Projecting typed rows into user objects
//!
//! A factory closure's parameter types decide the column types: each
//! parameter implements [`Column`], which supplies the descriptor used for
//! extraction and the positional cast back out of the [`Cell`].

use crate::error::TableError;
use crate::table::extractor::extract_table;
use crate::table::types::{Cell, Row, Table, TypeDescriptor};
use serde_json::Value;
use time::OffsetDateTime;

/// A Rust type that can be requested as a table column
pub trait Column: Sized {
    fn descriptor() -> TypeDescriptor;

    /// Take the value back out of a cell converted with [`Column::descriptor`]
    fn from_cell(cell: Cell) -> Option<Self>;
}

macro_rules! scalar_column {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Column for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Scalar(crate::table::types::ScalarKind::$kind)
                }

                fn from_cell(cell: Cell) -> Option<Self> {
                    match cell {
                        Cell::$kind(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_column! {
    bool => Bool,
    u8 => Byte,
    char => Char,
    i32 => Int,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    String => String,
}

impl Column for OffsetDateTime {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::DateTime
    }

    fn from_cell(cell: Cell) -> Option<Self> {
        match cell {
            Cell::DateTime(value) => Some(value),
            _ => None,
        }
    }
}

/// JSON null maps to `None` for every column type.
impl<T: Column> Column for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::nullable(T::descriptor())
    }

    fn from_cell(cell: Cell) -> Option<Self> {
        match cell {
            Cell::Null => Some(None),
            cell => T::from_cell(cell).map(Some),
        }
    }
}

impl<T: Column> Column for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn from_cell(cell: Cell) -> Option<Self> {
        match cell {
            Cell::List(items) => items.into_iter().map(T::from_cell).collect(),
            _ => None,
        }
    }
}

/// Make a `Deserialize` struct usable as an object column.
///
/// ```
/// use json_section::bound_column;
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, PartialEq, Deserialize)]
/// struct Person {
///     name: String,
///     age: i32,
/// }
///
/// bound_column!(Person);
/// ```
#[macro_export]
macro_rules! bound_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Column for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::structured::<$ty>()
                }

                fn from_cell(cell: $crate::Cell) -> ::std::option::Option<Self> {
                    cell.downcast::<$ty>()
                }
            }
        )+
    };
}

/// Make a `Deserialize` enum usable as a column matched by member name.
#[macro_export]
macro_rules! enum_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Column for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::enumeration::<$ty>()
                }

                fn from_cell(cell: $crate::Cell) -> ::std::option::Option<Self> {
                    cell.downcast::<$ty>()
                }
            }
        )+
    };
}

/// A factory taking one to four [`Column`] arguments
pub trait RowFactory<Args> {
    type Output;

    /// Column types, in parameter order
    fn descriptors() -> Vec<TypeDescriptor>;

    fn call(&self, row: Row) -> Self::Output;
}

macro_rules! row_factory {
    ($width:literal; $($arg:ident),+) => {
        impl<F, O, $($arg),+> RowFactory<($($arg,)+)> for F
        where
            F: Fn($($arg),+) -> O,
            $($arg: Column,)+
        {
            type Output = O;

            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$($arg::descriptor()),+]
            }

            fn call(&self, row: Row) -> O {
                assert_eq!(
                    row.len(),
                    $width,
                    "factory takes {} arguments but the row has {} cells",
                    $width,
                    row.len()
                );
                let mut cells = row.into_iter().enumerate();
                self($(take::<$arg>(&mut cells)),+)
            }
        }
    };
}

row_factory!(1; T1);
row_factory!(2; T1, T2);
row_factory!(3; T1, T2, T3);
row_factory!(4; T1, T2, T3, T4);

fn take<T: Column>(cells: &mut impl Iterator<Item = (usize, Cell)>) -> T {
    let (column, cell) = cells
        .next()
        .unwrap_or_else(|| panic!("row ended before all factory arguments were filled"));
    match T::from_cell(cell) {
        Some(value) => value,
        None => panic!(
            "column {} does not hold a {}",
            column,
            std::any::type_name::<T>()
        ),
    }
}

/// Build one object per row with `factory`, in row order.
///
/// The table must have been extracted with the factory's own column types;
/// anything else is a caller bug and panics.
pub fn project<Args, F>(table: Table, factory: F) -> Vec<F::Output>
where
    F: RowFactory<Args>,
{
    table.into_iter().map(|row| factory.call(row)).collect()
}

/// Extract `root` with the factory's column types and project every row
pub fn get_object_list<Args, F>(root: &Value, factory: F) -> Result<Vec<F::Output>, TableError>
where
    F: RowFactory<Args>,
{
    let table = extract_table(root, &F::descriptors())?;
    Ok(project(table, factory))
}
