//! ValueType trait for type-safe value conversions
//!
//! The `ValueType` trait maps Rust types to their corresponding `sea_query::Value` variant.
//! Record implementations use it to move field values across the type-erased
//! `Record::get` / `Record::set` boundary.
//!
//! ## Usage
//!
//! ```rust
//! use lifeguard_assoc::ValueType;
//! use sea_query::Value;
//!
//! let value: Value = ValueType::into_value(42i32);
//! assert!(matches!(value, Value::Int(Some(42))));
//! ```
//!
//! ## Implementation
//!
//! `ValueType` is implemented for:
//!
//! - Integer types: `i32`, `i64`
//! - Floating point: `f32`, `f64`
//! - Boolean: `bool`
//! - String: `String`
//! - Binary: `Vec<u8>`
//! - JSON: `serde_json::Value`
//! - Temporal: `chrono::NaiveDateTime`, `chrono::NaiveDate`, `chrono::NaiveTime`
//! - `uuid::Uuid` and `rust_decimal::Decimal`
//! - Option<T> for all above types

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Trait for mapping Rust types to their corresponding `sea_query::Value` variant.
///
/// ## Example
///
/// ```rust
/// use lifeguard_assoc::ValueType;
/// use sea_query::Value;
///
/// let value = ValueType::into_value(Some(42i32));
/// assert!(matches!(value, Value::Int(Some(42))));
///
/// let value = ValueType::into_value(None::<i32>);
/// assert!(matches!(value, Value::Int(None)));
/// ```
pub trait ValueType: Sized {
    /// Convert this value into a `sea_query::Value`.
    fn into_value(self) -> Value;

    /// Convert a `sea_query::Value` into this type, if possible.
    ///
    /// Returns `None` if the value doesn't match the expected variant or is null.
    fn from_value(value: Value) -> Option<Self>;

    /// Return the null variant for this type.
    ///
    /// Used by `Option<T>` to create the appropriate null `Value` variant
    /// when converting `None`.
    fn null_value() -> Value;
}

impl ValueType for i32 {
    fn into_value(self) -> Value {
        Value::Int(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(Some(v)) => Some(v),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Int(None)
    }
}

impl ValueType for i64 {
    fn into_value(self) -> Value {
        Value::BigInt(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::BigInt(Some(v)) => Some(v),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::BigInt(None)
    }
}

impl ValueType for f32 {
    fn into_value(self) -> Value {
        Value::Float(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(Some(v)) => Some(v),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Float(None)
    }
}

impl ValueType for f64 {
    fn into_value(self) -> Value {
        Value::Double(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(Some(v)) => Some(v),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Double(None)
    }
}

impl ValueType for bool {
    fn into_value(self) -> Value {
        Value::Bool(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(Some(v)) => Some(v),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Bool(None)
    }
}

impl ValueType for String {
    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        <String as sea_query::ValueType>::try_from(value).ok()
    }

    fn null_value() -> Value {
        Value::from(None::<String>)
    }
}

impl ValueType for Vec<u8> {
    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        <Vec<u8> as sea_query::ValueType>::try_from(value).ok()
    }

    fn null_value() -> Value {
        Value::from(None::<Vec<u8>>)
    }
}

impl ValueType for serde_json::Value {
    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        <serde_json::Value as sea_query::ValueType>::try_from(value).ok()
    }

    fn null_value() -> Value {
        Value::from(None::<serde_json::Value>)
    }
}

// Temporal, UUID and decimal variants go through sea_query's own conversions so the
// storage shape of the variant payload never leaks into this crate.
macro_rules! delegate_value_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ValueType for $ty {
                fn into_value(self) -> Value {
                    Value::from(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    <$ty as sea_query::ValueType>::try_from(value).ok()
                }

                fn null_value() -> Value {
                    Value::from(None::<$ty>)
                }
            }
        )*
    };
}

delegate_value_type!(NaiveDateTime, NaiveDate, NaiveTime, Uuid, Decimal);

impl<T: ValueType> ValueType for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => T::into_value(v),
            None => T::null_value(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match T::from_value(value.clone()) {
            Some(v) => Some(Some(v)),
            None => {
                // Only the null variant of T's own column type counts as an absent value
                if value == T::null_value() {
                    Some(None)
                } else {
                    None
                }
            }
        }
    }

    fn null_value() -> Value {
        T::null_value()
    }
}
