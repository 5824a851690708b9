//! Declared field types and typed values.
//!
//! `FieldType` is the closed set of column types a record field can declare.
//! Only a subset of them can take part in comparison expressions; the rest
//! (`Time`, `Json`, `Binary`) may be stored on records but any attempt to
//! compare on them is rejected.
//!
//! `TypedValue` is the tagged union used by expression conversion: a raw
//! `sea_query::Value` is coerced once against the declared `FieldType` and the
//! result carries its type from then on.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_query::Value;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Declared type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Variable-length text
    Text,
    /// Boolean
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInteger,
    /// Single-precision float
    Float,
    /// Double-precision float
    Double,
    /// Arbitrary-precision decimal
    Decimal,
    /// Timestamp without time zone
    Timestamp,
    /// Calendar date
    Date,
    /// UUID
    Uuid,
    /// Time of day (storable, not comparable)
    Time,
    /// JSON document (storable, not comparable)
    Json,
    /// Binary blob (storable, not comparable)
    Binary,
}

impl FieldType {
    /// Lower-case type name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::BigInteger => "big_integer",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::Timestamp => "timestamp",
            FieldType::Date => "date",
            FieldType::Uuid => "uuid",
            FieldType::Time => "time",
            FieldType::Json => "json",
            FieldType::Binary => "binary",
        }
    }

    /// Whether values of this type can be turned into comparison expressions
    pub fn is_comparable(self) -> bool {
        !matches!(self, FieldType::Time | FieldType::Json | FieldType::Binary)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to coerce a raw value into a declared field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueConversionError {
    /// The declared type has no typed representation
    Unsupported(FieldType),
    /// The raw value does not fit the declared type
    Mismatch {
        expected: FieldType,
        actual: String,
    },
}

impl fmt::Display for ValueConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConversionError::Unsupported(ty) => {
                write!(f, "Unsupported field type: {}", ty)
            }
            ValueConversionError::Mismatch { expected, actual } => {
                write!(f, "Value {} does not fit field type {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for ValueConversionError {}

/// A value of one comparable `FieldType`
///
/// # Example
///
/// ```rust
/// use lifeguard_assoc::{FieldType, TypedValue};
/// use sea_query::Value;
///
/// // 32-bit integers widen losslessly into 64-bit fields
/// let typed = TypedValue::coerce(FieldType::BigInteger, Value::Int(Some(7))).unwrap();
/// assert_eq!(typed, TypedValue::BigInteger(Some(7)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(Option<String>),
    Boolean(Option<bool>),
    Integer(Option<i32>),
    BigInteger(Option<i64>),
    Float(Option<f32>),
    Double(Option<f64>),
    Decimal(Option<Decimal>),
    Timestamp(Option<NaiveDateTime>),
    Date(Option<NaiveDate>),
    Uuid(Option<Uuid>),
}

impl TypedValue {
    /// Coerce a raw value into the declared field type.
    ///
    /// A null of any column type becomes the typed null of `field_type`.
    /// Integers convert between widths when no information is lost; a
    /// single-precision float widens to double; integers widen to decimal.
    pub fn coerce(field_type: FieldType, value: Value) -> Result<Self, ValueConversionError> {
        if !field_type.is_comparable() {
            return Err(ValueConversionError::Unsupported(field_type));
        }
        if is_null(&value) {
            return Self::null(field_type);
        }

        let mismatch = |value: &Value| ValueConversionError::Mismatch {
            expected: field_type,
            actual: format!("{:?}", value),
        };

        let typed = match field_type {
            FieldType::Text => TypedValue::Text(Some(
                <String as sea_query::ValueType>::try_from(value.clone())
                    .map_err(|_| mismatch(&value))?,
            )),
            FieldType::Boolean => match value {
                Value::Bool(Some(b)) => TypedValue::Boolean(Some(b)),
                ref other => return Err(mismatch(other)),
            },
            FieldType::Integer => {
                let wide = integer_of(&value).ok_or_else(|| mismatch(&value))?;
                let narrow = i32::try_from(wide).map_err(|_| mismatch(&value))?;
                TypedValue::Integer(Some(narrow))
            }
            FieldType::BigInteger => {
                let wide = integer_of(&value).ok_or_else(|| mismatch(&value))?;
                let narrow = i64::try_from(wide).map_err(|_| mismatch(&value))?;
                TypedValue::BigInteger(Some(narrow))
            }
            FieldType::Float => match value {
                Value::Float(Some(f)) => TypedValue::Float(Some(f)),
                ref other => return Err(mismatch(other)),
            },
            FieldType::Double => match value {
                Value::Double(Some(d)) => TypedValue::Double(Some(d)),
                Value::Float(Some(f)) => TypedValue::Double(Some(f64::from(f))),
                ref other => return Err(mismatch(other)),
            },
            FieldType::Decimal => {
                if let Some(wide) = integer_of(&value) {
                    let narrow = i64::try_from(wide).map_err(|_| mismatch(&value))?;
                    TypedValue::Decimal(Some(Decimal::from(narrow)))
                } else {
                    TypedValue::Decimal(Some(
                        <Decimal as sea_query::ValueType>::try_from(value.clone())
                            .map_err(|_| mismatch(&value))?,
                    ))
                }
            }
            FieldType::Timestamp => TypedValue::Timestamp(Some(
                <NaiveDateTime as sea_query::ValueType>::try_from(value.clone())
                    .map_err(|_| mismatch(&value))?,
            )),
            FieldType::Date => TypedValue::Date(Some(
                <NaiveDate as sea_query::ValueType>::try_from(value.clone())
                    .map_err(|_| mismatch(&value))?,
            )),
            FieldType::Uuid => TypedValue::Uuid(Some(
                <Uuid as sea_query::ValueType>::try_from(value.clone())
                    .map_err(|_| mismatch(&value))?,
            )),
            FieldType::Time | FieldType::Json | FieldType::Binary => {
                return Err(ValueConversionError::Unsupported(field_type))
            }
        };
        Ok(typed)
    }

    /// The typed null of a comparable field type
    pub fn null(field_type: FieldType) -> Result<Self, ValueConversionError> {
        Ok(match field_type {
            FieldType::Text => TypedValue::Text(None),
            FieldType::Boolean => TypedValue::Boolean(None),
            FieldType::Integer => TypedValue::Integer(None),
            FieldType::BigInteger => TypedValue::BigInteger(None),
            FieldType::Float => TypedValue::Float(None),
            FieldType::Double => TypedValue::Double(None),
            FieldType::Decimal => TypedValue::Decimal(None),
            FieldType::Timestamp => TypedValue::Timestamp(None),
            FieldType::Date => TypedValue::Date(None),
            FieldType::Uuid => TypedValue::Uuid(None),
            FieldType::Time | FieldType::Json | FieldType::Binary => {
                return Err(ValueConversionError::Unsupported(field_type))
            }
        })
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            TypedValue::Text(_) => FieldType::Text,
            TypedValue::Boolean(_) => FieldType::Boolean,
            TypedValue::Integer(_) => FieldType::Integer,
            TypedValue::BigInteger(_) => FieldType::BigInteger,
            TypedValue::Float(_) => FieldType::Float,
            TypedValue::Double(_) => FieldType::Double,
            TypedValue::Decimal(_) => FieldType::Decimal,
            TypedValue::Timestamp(_) => FieldType::Timestamp,
            TypedValue::Date(_) => FieldType::Date,
            TypedValue::Uuid(_) => FieldType::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            TypedValue::Text(v) => v.is_none(),
            TypedValue::Boolean(v) => v.is_none(),
            TypedValue::Integer(v) => v.is_none(),
            TypedValue::BigInteger(v) => v.is_none(),
            TypedValue::Float(v) => v.is_none(),
            TypedValue::Double(v) => v.is_none(),
            TypedValue::Decimal(v) => v.is_none(),
            TypedValue::Timestamp(v) => v.is_none(),
            TypedValue::Date(v) => v.is_none(),
            TypedValue::Uuid(v) => v.is_none(),
        }
    }

    /// Convert back into the `sea_query::Value` variant of the declared type
    pub fn to_value(&self) -> Value {
        match self.clone() {
            TypedValue::Text(v) => Value::from(v),
            TypedValue::Boolean(v) => Value::Bool(v),
            TypedValue::Integer(v) => Value::Int(v),
            TypedValue::BigInteger(v) => Value::BigInt(v),
            TypedValue::Float(v) => Value::Float(v),
            TypedValue::Double(v) => Value::Double(v),
            TypedValue::Decimal(v) => Value::from(v),
            TypedValue::Timestamp(v) => Value::from(v),
            TypedValue::Date(v) => Value::from(v),
            TypedValue::Uuid(v) => Value::from(v),
        }
    }

    /// Ordering between two values of the same type; `None` when the types differ
    /// or either side is null.
    pub fn compare(&self, other: &TypedValue) -> Option<Ordering> {
        match (self, other) {
            (TypedValue::Text(Some(a)), TypedValue::Text(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Boolean(Some(a)), TypedValue::Boolean(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Integer(Some(a)), TypedValue::Integer(Some(b))) => Some(a.cmp(b)),
            (TypedValue::BigInteger(Some(a)), TypedValue::BigInteger(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Float(Some(a)), TypedValue::Float(Some(b))) => a.partial_cmp(b),
            (TypedValue::Double(Some(a)), TypedValue::Double(Some(b))) => a.partial_cmp(b),
            (TypedValue::Decimal(Some(a)), TypedValue::Decimal(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Timestamp(Some(a)), TypedValue::Timestamp(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Date(Some(a)), TypedValue::Date(Some(b))) => Some(a.cmp(b)),
            (TypedValue::Uuid(Some(a)), TypedValue::Uuid(Some(b))) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Whether a raw value is the null of any column type
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::ChronoDate(None)
            | Value::ChronoTime(None)
            | Value::ChronoDateTime(None)
            | Value::ChronoDateTimeUtc(None)
            | Value::ChronoDateTimeLocal(None)
            | Value::ChronoDateTimeWithTimeZone(None)
            | Value::Uuid(None)
            | Value::Decimal(None)
    )
}

fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::TinyInt(Some(v)) => Some(i128::from(*v)),
        Value::SmallInt(Some(v)) => Some(i128::from(*v)),
        Value::Int(Some(v)) => Some(i128::from(*v)),
        Value::BigInt(Some(v)) => Some(i128::from(*v)),
        Value::TinyUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::SmallUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::Unsigned(Some(v)) => Some(i128::from(*v)),
        Value::BigUnsigned(Some(v)) => Some(i128::from(*v)),
        _ => None,
    }
}
