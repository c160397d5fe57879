//! Cell conversion: one JSON value in, one typed [`Cell`] out
//!
//! Dispatch is by descriptor category. Structured and enum columns are
//! forwarded to their [`Binder`](crate::table::binder::Binder); scalars,
//! nullable scalars, dates and collections are read directly.

use crate::error::{json_kind, ConversionError};
use crate::table::types::{Cell, ScalarKind, TypeDescriptor};
use serde_json::{Number, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Convert one JSON value according to its column descriptor
pub fn convert_cell(value: &Value, descriptor: &TypeDescriptor) -> Result<Cell, ConversionError> {
    match descriptor {
        TypeDescriptor::Structured(binder) | TypeDescriptor::Enum(binder) => {
            binder.bind(value).map(Cell::Bound)
        }
        TypeDescriptor::Scalar(kind) => convert_scalar(value, *kind),
        TypeDescriptor::Nullable(kind) => match value {
            Value::Null => Ok(Cell::Null),
            _ => convert_scalar(value, *kind),
        },
        TypeDescriptor::Optional(inner) => match value {
            Value::Null => Ok(Cell::Null),
            _ => convert_cell(value, inner),
        },
        TypeDescriptor::DateTime => convert_datetime(value).map(Cell::DateTime),
        TypeDescriptor::Collection(element) => convert_collection(value, element),
    }
}

fn convert_collection(value: &Value, element: &TypeDescriptor) -> Result<Cell, ConversionError> {
    let Value::Array(items) = value else {
        return Err(mismatch(&TypeDescriptor::list(element.clone()).name(), value));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            convert_cell(item, element).map_err(|source| ConversionError::Element {
                index,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Cell::List)
}

fn convert_scalar(value: &Value, kind: ScalarKind) -> Result<Cell, ConversionError> {
    if value.is_null() {
        return Err(ConversionError::UnexpectedNull {
            target: kind.name().to_string(),
        });
    }

    let cell = match kind {
        ScalarKind::Bool => Cell::Bool(read_bool(value)?),
        ScalarKind::Char => Cell::Char(read_char(value)?),
        ScalarKind::String => Cell::String(read_string(value)?),
        ScalarKind::Byte => Cell::Byte(read_integer(value, kind, |n| u8::try_from(n).ok())?),
        ScalarKind::Int => Cell::Int(read_integer(value, kind, |n| i32::try_from(n).ok())?),
        ScalarKind::Long => Cell::Long(read_integer(value, kind, |n| i64::try_from(n).ok())?),
        ScalarKind::ULong => Cell::ULong(read_integer(value, kind, |n| u64::try_from(n).ok())?),
        ScalarKind::Float => Cell::Float(read_float(value, kind)? as f32),
        ScalarKind::Double => Cell::Double(read_float(value, kind)?),
    };
    Ok(cell)
}

/// Read an integral value as i128, then narrow it with `narrow`
fn read_integer<T>(
    value: &Value,
    kind: ScalarKind,
    narrow: impl Fn(i128) -> Option<T>,
) -> Result<T, ConversionError> {
    let wide = match value {
        Value::Number(n) => integral_number(n).ok_or_else(|| ConversionError::OutOfRange {
            value: n.to_string(),
            target: kind.name().to_string(),
        })?,
        Value::String(s) => s.trim().parse::<i128>().map_err(|_| unparseable(s, kind.name()))?,
        _ => return Err(mismatch(kind.name(), value)),
    };

    narrow(wide).ok_or_else(|| ConversionError::OutOfRange {
        value: wide.to_string(),
        target: kind.name().to_string(),
    })
}

/// Integers as-is; floats only when they carry no fractional part
fn integral_number(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = n.as_u64() {
        return Some(u as i128);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i128::MAX as f64)
        .map(|f| f as i128)
}

fn read_float(value: &Value, kind: ScalarKind) -> Result<f64, ConversionError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| unparseable(&n.to_string(), kind.name())),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| unparseable(s, kind.name())),
        _ => Err(mismatch(kind.name(), value)),
    }
}

fn read_bool(value: &Value) -> Result<bool, ConversionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        Value::String(s) => Err(unparseable(s, "bool")),
        _ => Err(mismatch("bool", value)),
    }
}

fn read_char(value: &Value) -> Result<char, ConversionError> {
    let Value::String(s) = value else {
        return Err(mismatch("char", value));
    };
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(unparseable(s, "char")),
    }
}

fn read_string(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(mismatch("string", value)),
    }
}

/// Accepts RFC 3339 and ISO-like local forms; local forms are taken as UTC
fn convert_datetime(value: &Value) -> Result<OffsetDateTime, ConversionError> {
    let Value::String(s) = value else {
        return Err(mismatch("DateTime", value));
    };
    let text = s.trim();

    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(dt);
    }
    let local = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
        )
    })
    .or_else(|_| Date::parse(text, format_description!("[year]-[month]-[day]")).map(Date::midnight));

    local
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| unparseable(s, "DateTime"))
}

fn mismatch(expected: &str, found: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.to_string(),
        found: json_kind(found),
    }
}

fn unparseable(value: &str, target: &str) -> ConversionError {
    ConversionError::Unparseable {
        value: value.to_string(),
        target: target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use time::macros::datetime;

    fn scalar(kind: ScalarKind) -> TypeDescriptor {
        TypeDescriptor::Scalar(kind)
    }

    #[test]
    fn test_integers() {
        let int = scalar(ScalarKind::Int);
        assert_eq!(convert_cell(&json!(322), &int).unwrap(), Cell::Int(322));
        assert_eq!(convert_cell(&json!(" 42 "), &int).unwrap(), Cell::Int(42));
        assert_eq!(convert_cell(&json!(7.0), &int).unwrap(), Cell::Int(7));

        assert!(matches!(
            convert_cell(&json!(7.5), &int),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert_cell(&json!(3_000_000_000u64), &int),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert_cell(&json!("abc"), &int),
            Err(ConversionError::Unparseable { .. })
        ));
        assert!(matches!(
            convert_cell(&json!(-1), &scalar(ScalarKind::Byte)),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert_eq!(
            convert_cell(&json!(u64::MAX), &scalar(ScalarKind::ULong)).unwrap(),
            Cell::ULong(u64::MAX)
        );
    }

    #[test]
    fn test_null_only_for_nullable() {
        let err = convert_cell(&json!(null), &scalar(ScalarKind::Int)).unwrap_err();
        assert!(matches!(err, ConversionError::UnexpectedNull { .. }));

        let nullable = TypeDescriptor::Nullable(ScalarKind::Int);
        assert_eq!(convert_cell(&json!(null), &nullable).unwrap(), Cell::Null);
        assert_eq!(convert_cell(&json!(5), &nullable).unwrap(), Cell::Int(5));
        assert!(convert_cell(&json!(true), &nullable).is_err());

        let nullable_date = TypeDescriptor::nullable(TypeDescriptor::DateTime);
        assert_eq!(convert_cell(&json!(null), &nullable_date).unwrap(), Cell::Null);
        assert_eq!(
            convert_cell(&json!("2017-03-13"), &nullable_date).unwrap(),
            Cell::DateTime(time::macros::datetime!(2017-03-13 0:00 UTC))
        );
        // null elements inside a nullable list are still rejected
        let nullable_list = TypeDescriptor::nullable(TypeDescriptor::list(scalar(ScalarKind::Int)));
        assert_eq!(convert_cell(&json!(null), &nullable_list).unwrap(), Cell::Null);
        assert!(convert_cell(&json!([1, null]), &nullable_list).is_err());
    }

    #[test]
    fn test_other_scalars() {
        assert_eq!(
            convert_cell(&json!(12), &scalar(ScalarKind::String)).unwrap(),
            Cell::from("12")
        );
        assert_eq!(
            convert_cell(&json!("TRUE"), &scalar(ScalarKind::Bool)).unwrap(),
            Cell::Bool(true)
        );
        assert_eq!(
            convert_cell(&json!("x"), &scalar(ScalarKind::Char)).unwrap(),
            Cell::Char('x')
        );
        assert!(convert_cell(&json!("xy"), &scalar(ScalarKind::Char)).is_err());
        assert_eq!(
            convert_cell(&json!(1.5), &scalar(ScalarKind::Double)).unwrap(),
            Cell::Double(1.5)
        );
        assert!(convert_cell(&json!([1]), &scalar(ScalarKind::String)).is_err());
    }

    #[test]
    fn test_datetime_forms() {
        let date = TypeDescriptor::DateTime;
        assert_eq!(
            convert_cell(&json!("2017-03-13"), &date).unwrap(),
            Cell::DateTime(datetime!(2017-03-13 0:00 UTC))
        );
        assert_eq!(
            convert_cell(&json!("2017-03-13T10:30:00"), &date).unwrap(),
            Cell::DateTime(datetime!(2017-03-13 10:30 UTC))
        );
        assert_eq!(
            convert_cell(&json!("2017-03-13 10:30:00"), &date).unwrap(),
            Cell::DateTime(datetime!(2017-03-13 10:30 UTC))
        );
        assert_eq!(
            convert_cell(&json!("2017-03-13T10:30:00+02:00"), &date).unwrap(),
            Cell::DateTime(datetime!(2017-03-13 10:30 +2))
        );
        assert!(matches!(
            convert_cell(&json!("13th of March"), &date),
            Err(ConversionError::Unparseable { .. })
        ));
        assert!(convert_cell(&json!(20170313), &date).is_err());
    }

    #[test]
    fn test_collections() {
        let ints = TypeDescriptor::list(scalar(ScalarKind::Int));
        assert_eq!(convert_cell(&json!([12, 3, 4, 5]), &ints).unwrap(), Cell::from(vec![12i32, 3, 4, 5]));
        assert_eq!(convert_cell(&json!([]), &ints).unwrap(), Cell::List(vec![]));

        let err = convert_cell(&json!([1, "x"]), &ints).unwrap_err();
        assert!(matches!(err, ConversionError::Element { index: 1, .. }));

        assert!(matches!(
            convert_cell(&json!(null), &ints),
            Err(ConversionError::TypeMismatch { .. })
        ));
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Person {
        name: String,
        age: i32,
    }

    #[test]
    fn test_structured_and_enum() {
        let person = TypeDescriptor::structured::<Person>();
        let cell = convert_cell(&json!({"Name": "John", "Age": 39}), &person).unwrap();
        assert_eq!(
            cell.downcast::<Person>(),
            Some(Person { name: "John".to_string(), age: 39 })
        );
        assert!(convert_cell(&json!({"Name": "John"}), &person).is_err());

        #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
        enum Day {
            Monday,
            Sunday,
        }
        let day = TypeDescriptor::enumeration::<Day>();
        let cell = convert_cell(&json!("Sunday"), &day).unwrap();
        assert_eq!(cell.downcast_ref::<Day>(), Some(&Day::Sunday));
        assert!(matches!(
            convert_cell(&json!("Someday"), &day),
            Err(ConversionError::Binding { .. })
        ));

        let people = TypeDescriptor::list(person);
        let cell = convert_cell(&json!([{"Name": "Mark", "Age": 37}]), &people).unwrap();
        let Cell::List(items) = cell else { panic!("expected list") };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].downcast_ref::<Person>().map(|p| p.age), Some(37));
    }
}
