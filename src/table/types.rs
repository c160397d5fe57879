use crate::table::binder::{Binder, BoundValue};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Primitive kinds a scalar column can be read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Byte,
    Char,
    Int,
    Long,
    ULong,
    Float,
    Double,
    String,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Byte => "byte",
            ScalarKind::Char => "char",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::ULong => "ulong",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" | "boolean" => ScalarKind::Bool,
            "byte" | "u8" => ScalarKind::Byte,
            "char" => ScalarKind::Char,
            "int" | "i32" => ScalarKind::Int,
            "long" | "i64" => ScalarKind::Long,
            "ulong" | "u64" => ScalarKind::ULong,
            "float" | "f32" => ScalarKind::Float,
            "double" | "f64" => ScalarKind::Double,
            "string" | "str" => ScalarKind::String,
            _ => return None,
        };
        Some(kind)
    }
}

/// How a requested column type gets converted
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    /// Scalar column where JSON null becomes [`Cell::Null`]
    Nullable(ScalarKind),
    /// Any other column type that also accepts JSON null
    Optional(Box<TypeDescriptor>),
    Enum(Binder),
    DateTime,
    Structured(Binder),
    Collection(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::Collection(Box::new(element))
    }

    /// Nullable form of `inner`: scalars stay scalars, everything else wraps
    pub fn nullable(inner: TypeDescriptor) -> Self {
        match inner {
            TypeDescriptor::Scalar(kind) => TypeDescriptor::Nullable(kind),
            other => TypeDescriptor::Optional(Box::new(other)),
        }
    }

    /// Enum column bound by member name through `Deserialize`
    pub fn enumeration<T>() -> Self
    where
        T: DeserializeOwned + fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
    {
        TypeDescriptor::Enum(Binder::of::<T>())
    }

    /// Object column bound field-by-field through `Deserialize`
    pub fn structured<T>() -> Self
    where
        T: DeserializeOwned + fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
    {
        TypeDescriptor::Structured(Binder::of::<T>())
    }

    /// Name reported in conversion errors, e.g. `int?` or `List<Person>`
    pub fn name(&self) -> String {
        match self {
            TypeDescriptor::Scalar(kind) => kind.name().to_string(),
            TypeDescriptor::Nullable(kind) => format!("{}?", kind.name()),
            TypeDescriptor::Optional(inner) => format!("{}?", inner.name()),
            TypeDescriptor::Enum(binder) | TypeDescriptor::Structured(binder) => binder.type_name(),
            TypeDescriptor::DateTime => "DateTime".to_string(),
            TypeDescriptor::Collection(element) => format!("List<{}>", element.name()),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown column type {0:?}")]
pub struct UnknownType(pub String);

/// Parses the textual names accepted on the command line:
/// `int`, `int?`, `date`, `date?`, `list<int>`, `string[]`.
/// Enum and structured columns need a Rust type and cannot be named here.
impl FromStr for TypeDescriptor {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let lower = text.to_ascii_lowercase();

        if let Some(inner) = lower.strip_suffix('?') {
            return Ok(TypeDescriptor::nullable(inner.parse()?));
        }
        if let Some(inner) = lower.strip_suffix("[]") {
            return Ok(TypeDescriptor::list(inner.parse()?));
        }
        if let Some(inner) = lower
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Ok(TypeDescriptor::list(inner.parse()?));
        }
        if lower == "date" || lower == "datetime" {
            return Ok(TypeDescriptor::DateTime);
        }
        ScalarKind::from_name(&lower)
            .map(TypeDescriptor::Scalar)
            .ok_or_else(|| UnknownType(text.to_string()))
    }
}

/// One converted value
#[derive(Debug)]
pub enum Cell {
    Null,
    Bool(bool),
    Byte(u8),
    Char(char),
    Int(i32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
    DateTime(OffsetDateTime),
    List(Vec<Cell>),
    Bound(Box<dyn BoundValue>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Borrow a bound (structured or enum) value as its concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Cell::Bound(value) => (**value).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take a bound value out of the cell as its concrete type
    pub fn downcast<T: 'static>(self) -> Option<T> {
        match self {
            Cell::Bound(value) => value.into_any().downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }
}

impl Clone for Cell {
    fn clone(&self) -> Self {
        match self {
            Cell::Null => Cell::Null,
            Cell::Bool(v) => Cell::Bool(*v),
            Cell::Byte(v) => Cell::Byte(*v),
            Cell::Char(v) => Cell::Char(*v),
            Cell::Int(v) => Cell::Int(*v),
            Cell::Long(v) => Cell::Long(*v),
            Cell::ULong(v) => Cell::ULong(*v),
            Cell::Float(v) => Cell::Float(*v),
            Cell::Double(v) => Cell::Double(*v),
            Cell::String(v) => Cell::String(v.clone()),
            Cell::DateTime(v) => Cell::DateTime(*v),
            Cell::List(items) => Cell::List(items.clone()),
            Cell::Bound(value) => Cell::Bound((**value).clone_box()),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Byte(a), Cell::Byte(b)) => a == b,
            (Cell::Char(a), Cell::Char(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Long(a), Cell::Long(b)) => a == b,
            (Cell::ULong(a), Cell::ULong(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a == b,
            (Cell::Double(a), Cell::Double(b)) => a == b,
            (Cell::String(a), Cell::String(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            (Cell::List(a), Cell::List(b)) => a == b,
            (Cell::Bound(a), Cell::Bound(b)) => **a == **b,
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Bool(v) => write!(f, "{}", v),
            Cell::Byte(v) => write!(f, "{}", v),
            Cell::Char(v) => write!(f, "{}", v),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Long(v) => write!(f, "{}", v),
            Cell::ULong(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Double(v) => write!(f, "{}", v),
            Cell::String(v) => f.write_str(v),
            Cell::DateTime(v) => write!(f, "{}", v),
            Cell::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Cell::Bound(value) => write!(f, "{:?}", value),
        }
    }
}

macro_rules! cell_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Cell {
                fn from(value: $ty) -> Self {
                    Cell::$variant(value)
                }
            }
        )*
    };
}

cell_from! {
    bool => Bool,
    u8 => Byte,
    char => Char,
    i32 => Int,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    String => String,
    OffsetDateTime => DateTime,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

impl<T: Into<Cell>> From<Vec<T>> for Cell {
    fn from(values: Vec<T>) -> Self {
        Cell::List(values.into_iter().map(Into::into).collect())
    }
}

/// One table row, positionally aligned with the column types
pub type Row = Vec<Cell>;

/// Typed rows extracted from a JSON array of arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: usize,
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn new(columns: usize, rows: Vec<Row>) -> Self {
        Table { columns, rows }
    }

    /// Number of columns every row carries
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for Table {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
