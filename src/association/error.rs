//! Error types for association resolution and query construction.

use crate::executor::LifeError;
use crate::model::ModelError;
use crate::value::FieldType;
use std::fmt;

/// Error type for association operations
///
/// `FieldNotFound` and `UnsupportedType` are raised while a relation or
/// condition is being built, never deferred to execution.
#[derive(Debug)]
pub enum AssociationError {
    /// A condition map, foreign key or join key names a field the record type does not have
    FieldNotFound { record: String, field: String },
    /// A field's declared type has no comparison expression mapping
    UnsupportedType { field: String, field_type: FieldType },
    /// A value or expression does not fit the type it is compared against
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: String,
    },
    /// The record type has no companion in the registry
    NotRegistered(String),
    /// Reading or writing a record field failed
    Model(ModelError),
    /// The executor failed to run a relation, save or transaction
    Execution(LifeError),
}

impl fmt::Display for AssociationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationError::FieldNotFound { record, field } => {
                write!(f, "Field not found: {}.{}", record, field)
            }
            AssociationError::UnsupportedType { field, field_type } => {
                write!(f, "Unsupported type {} for field {}", field_type, field)
            }
            AssociationError::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Type mismatch for field {}: expected {}, got {}",
                field, expected, actual
            ),
            AssociationError::NotRegistered(record) => {
                write!(f, "Record type not registered: {}", record)
            }
            AssociationError::Model(e) => write!(f, "Model error: {}", e),
            AssociationError::Execution(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AssociationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssociationError::Model(e) => Some(e),
            AssociationError::Execution(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for AssociationError {
    fn from(err: ModelError) -> Self {
        AssociationError::Model(err)
    }
}

impl From<LifeError> for AssociationError {
    fn from(err: LifeError) -> Self {
        AssociationError::Execution(err)
    }
}

impl AssociationError {
    pub(crate) fn field_not_found(record: impl Into<String>, field: impl Into<String>) -> Self {
        AssociationError::FieldNotFound {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Lift a record-level missing field into the association error naming the record type
    pub(crate) fn from_model(record: &str, err: ModelError) -> Self {
        match err {
            ModelError::FieldNotFound(field) => AssociationError::field_not_found(record, field),
            other => AssociationError::Model(other),
        }
    }
}
