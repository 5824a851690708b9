//! Value type system for Lifeguard associations
//!
//! This module provides the closed set of field types an association can compare on,
//! and the conversions between Rust scalars, `sea_query::Value` and typed values.
//!
//! ## Types
//!
//! - **`FieldType`** - The declared type of a record field
//! - **`TypedValue`** - A tagged union holding a value of one supported `FieldType`
//! - **`ValueType`** - Maps Rust types to their corresponding `sea_query::Value` variant

pub mod field_type;
pub mod types;

pub use field_type::{FieldType, TypedValue, ValueConversionError};
pub use types::ValueType;
