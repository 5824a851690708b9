//! Record trait and field metadata
//!
//! This module provides the `Record` trait, which gives the association layer
//! type-erased access to a record's fields by name, and `FieldInfo`, which
//! describes one field of a record type. Similar to SeaORM's `ModelTrait`,
//! but keyed by field name so that condition maps and foreign keys can be
//! resolved at runtime.

pub mod error;
pub mod field;

pub use error::ModelError;
pub use field::FieldInfo;

use crate::value::ValueType;
use sea_query::Value;

/// Name of the identity field every record type carries
pub const ID_FIELD: &str = "id";

/// Trait for records that associations can read and write
///
/// # Example
///
/// ```rust
/// use lifeguard_assoc::{extract, ModelError, Record, ValueType};
/// use sea_query::Value;
///
/// #[derive(Clone, Debug, Default)]
/// struct Post {
///     id: Option<i64>,
///     title: String,
/// }
///
/// impl Record for Post {
///     fn get(&self, field: &str) -> Option<Value> {
///         match field {
///             "id" => Some(self.id.into_value()),
///             "title" => Some(self.title.clone().into_value()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError> {
///         match field {
///             "id" => self.id = extract(field, value)?,
///             "title" => self.title = extract(field, value)?,
///             _ => return Err(ModelError::FieldNotFound(field.to_string())),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Record: Clone + std::fmt::Debug + 'static {
    /// Read the raw value of a field; `None` if the record has no such field
    fn get(&self, field: &str) -> Option<Value>;

    /// Write the raw value of a field
    fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError>;

    /// Validation hook run before persisting; an `Err` makes `save` report `false`
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Extract a typed field value, reporting a mismatch against `field`
///
/// Intended for `Record::set` implementations.
pub fn extract<V: ValueType>(field: &str, value: Value) -> Result<V, ModelError> {
    V::from_value(value.clone()).ok_or_else(|| ModelError::InvalidValueType {
        column: field.to_string(),
        expected: std::any::type_name::<V>().to_string(),
        actual: format!("{:?}", value),
    })
}
