//! Structural binding of JSON values onto user types
//!
//! Structured and enum columns are not converted by hand. Each target type
//! brings its own binding logic through `serde::Deserialize`, and a
//! [`Binder`] captures that logic as a plain function pointer when the
//! column's descriptor is built. Converted values are carried type-erased
//! as [`BoundValue`] trait objects and recovered with a downcast.

use crate::error::ConversionError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;

/// A value produced by a [`Binder`], stored type-erased inside a cell
pub trait BoundValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_box(&self) -> Box<dyn BoundValue>;
    fn eq_dyn(&self, other: &dyn BoundValue) -> bool;
}

impl<T> BoundValue for T
where
    T: Any + fmt::Debug + Clone + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_box(&self) -> Box<dyn BoundValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn BoundValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl PartialEq for dyn BoundValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

type BindFn = fn(&Value) -> Result<Box<dyn BoundValue>, serde_json::Error>;

/// Binding capability for one target type
#[derive(Clone, Copy)]
pub struct Binder {
    type_id: TypeId,
    full_name: &'static str,
    bind: BindFn,
}

impl Binder {
    /// Binder backed by the type's `Deserialize` implementation
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
    {
        Binder {
            type_id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
            bind: bind_with_serde::<T>,
        }
    }

    /// Target type name with module paths stripped
    pub fn type_name(&self) -> String {
        short_type_name(self.full_name)
    }

    pub fn bind(&self, value: &Value) -> Result<Box<dyn BoundValue>, ConversionError> {
        (self.bind)(value).map_err(|source| ConversionError::Binding {
            target: self.type_name(),
            source,
        })
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binder").field(&self.full_name).finish()
    }
}

impl PartialEq for Binder {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

fn bind_with_serde<T>(value: &Value) -> Result<Box<dyn BoundValue>, serde_json::Error>
where
    T: DeserializeOwned + fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
{
    let bound = T::deserialize(value)?;
    Ok(Box::new(bound))
}

/// `core::option::Option<app::Person>` -> `Option<Person>`
fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            short.push_str(last_path_segment(&segment));
            segment.clear();
            short.push(c);
        } else {
            segment.push(c);
        }
    }
    short.push_str(last_path_segment(&segment));
    short
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
