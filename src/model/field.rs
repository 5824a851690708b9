//! Field metadata for record types.

use super::{ModelError, Record};
use crate::value::{FieldType, TypedValue, ValueConversionError};
use sea_query::Value;

/// Metadata for one field of a record type
///
/// Each field declares exactly one `FieldType`. Values written through
/// [`FieldInfo::set`] are coerced to that type first, so a record never
/// receives a value of the wrong shape from the association layer.
///
/// # Example
///
/// ```rust
/// use lifeguard_assoc::{FieldInfo, FieldType};
///
/// let id = FieldInfo::new("id", FieldType::BigInteger).primary_key();
/// let blog_id = FieldInfo::new("blog_id", FieldType::BigInteger);
/// assert!(id.is_primary_key());
/// assert_eq!(blog_id.column_name(), "blog_id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: String,
    column: String,
    field_type: FieldType,
    primary_key: bool,
}

impl FieldInfo {
    /// Create a field whose column has the same name as the field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            field_type,
            primary_key: false,
        }
    }

    /// Mark this field as the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Store this field under a different column name
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Read this field's raw value from a record
    pub fn get<R: Record>(&self, record: &R) -> Result<Value, ModelError> {
        record
            .get(&self.name)
            .ok_or_else(|| ModelError::FieldNotFound(self.name.clone()))
    }

    /// Write a raw value into this field of a record, coercing it to the declared type
    ///
    /// Fields whose type has no typed representation (`Time`, `Json`, `Binary`)
    /// are written through unchanged.
    pub fn set<R: Record>(&self, record: &mut R, value: Value) -> Result<(), ModelError> {
        let value = match TypedValue::coerce(self.field_type, value.clone()) {
            Ok(typed) => typed.to_value(),
            Err(ValueConversionError::Unsupported(_)) => value,
            Err(ValueConversionError::Mismatch { expected, actual }) => {
                return Err(ModelError::InvalidValueType {
                    column: self.name.clone(),
                    expected: expected.to_string(),
                    actual,
                })
            }
        };
        record.set(&self.name, value)
    }
}
