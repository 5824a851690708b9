//! Error types for record field access.

/// Error type for `Record` field access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Invalid value type for the column
    InvalidValueType {
        column: String,
        expected: String,
        actual: String,
    },
    /// The record has no field with this name
    FieldNotFound(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidValueType {
                column,
                expected,
                actual,
            } => write!(
                f,
                "Invalid value type for column {}: expected {}, got {}",
                column, expected, actual
            ),
            ModelError::FieldNotFound(field) => {
                write!(f, "Field not found: {}", field)
            }
        }
    }
}

impl std::error::Error for ModelError {}
