//! Typed comparison expressions.
//!
//! Every filter an association puts on a relation is built here. A raw
//! `sea_query::Value` is resolved against the declared [`FieldType`] of the
//! field it is compared with, producing a [`TypedExpr`]; two typed
//! expressions of the same type make an equality [`Predicate`], a typed
//! expression and a value list make a set-membership predicate.
//!
//! Predicates are backend neutral. They render to a `sea_query::Condition`
//! for SQL executors and evaluate directly against rows for the in-memory
//! executor.
//!
//! # Example
//!
//! ```rust
//! use lifeguard_assoc::query::{to_equality_expression, to_expression};
//! use lifeguard_assoc::{FieldInfo, FieldType};
//! use sea_query::Value;
//!
//! let blog_id = FieldInfo::new("blog_id", FieldType::BigInteger);
//! let column = blog_id.column_expr("posts").unwrap();
//! let value = to_expression(&blog_id, Value::Int(Some(1))).unwrap();
//! let predicate = to_equality_expression(column, value).unwrap();
//! assert_eq!(predicate.columns().len(), 1);
//! ```

use crate::association::AssociationError;
use crate::model::FieldInfo;
use crate::value::{FieldType, TypedValue, ValueConversionError};
use sea_query::{Condition, DynIden, Expr, ExprTrait, Value};
use std::cmp::Ordering;
use std::fmt;

/// A table-qualified column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    table: String,
    column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub(crate) fn to_expr(&self) -> Expr {
        Expr::col((
            DynIden::from(self.table.clone()),
            DynIden::from(self.column.clone()),
        ))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One side of a comparison, tagged with its field type
#[derive(Debug, Clone, PartialEq)]
pub enum TypedExpr {
    /// A column whose field declares `field_type`
    Column {
        column: ColumnRef,
        field_type: FieldType,
    },
    /// A literal already coerced to its field type
    Literal(TypedValue),
}

impl TypedExpr {
    pub fn field_type(&self) -> FieldType {
        match self {
            TypedExpr::Column { field_type, .. } => *field_type,
            TypedExpr::Literal(value) => value.field_type(),
        }
    }

    /// Short description used in error messages
    pub fn label(&self) -> String {
        match self {
            TypedExpr::Column { column, .. } => column.to_string(),
            TypedExpr::Literal(value) => format!("{:?}", value.to_value()),
        }
    }

    pub(crate) fn is_null_literal(&self) -> bool {
        matches!(self, TypedExpr::Literal(value) if value.is_null())
    }

    fn to_expr(&self) -> Expr {
        match self {
            TypedExpr::Column { column, .. } => column.to_expr(),
            TypedExpr::Literal(value) => Expr::val(value.to_value()),
        }
    }

    /// Resolve to a typed value given the raw value of every column
    fn resolve(&self, lookup: &dyn Fn(&ColumnRef) -> Option<Value>) -> Option<TypedValue> {
        match self {
            TypedExpr::Column { column, field_type } => {
                let raw = lookup(column)?;
                TypedValue::coerce(*field_type, raw).ok()
            }
            TypedExpr::Literal(value) => Some(value.clone()),
        }
    }
}

/// A boolean filter over the columns of a relation
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `left = right`; a null literal on either side means `IS NULL`
    Eq(TypedExpr, TypedExpr),
    /// `expr IN (values)`
    In(TypedExpr, Vec<TypedValue>),
    /// Conjunction; an empty conjunction is always true
    And(Vec<Predicate>),
    /// Matches no row
    Never,
}

impl Predicate {
    /// Conjunction of `predicates`, flattening nested conjunctions
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut parts = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        Predicate::And(parts)
    }

    /// Every column the predicate reads
    pub fn columns(&self) -> Vec<&ColumnRef> {
        fn collect<'p>(expr: &'p TypedExpr, out: &mut Vec<&'p ColumnRef>) {
            if let TypedExpr::Column { column, .. } = expr {
                out.push(column);
            }
        }

        let mut out = Vec::new();
        match self {
            Predicate::Eq(left, right) => {
                collect(left, &mut out);
                collect(right, &mut out);
            }
            Predicate::In(expr, _) => collect(expr, &mut out),
            Predicate::And(parts) => {
                for part in parts {
                    out.extend(part.columns());
                }
            }
            Predicate::Never => {}
        }
        out
    }

    /// Render as a `sea_query` condition
    pub fn to_condition(&self) -> Condition {
        match self {
            Predicate::Eq(left, right) if right.is_null_literal() => {
                Condition::all().add(left.to_expr().is_null())
            }
            Predicate::Eq(left, right) if left.is_null_literal() => {
                Condition::all().add(right.to_expr().is_null())
            }
            Predicate::Eq(left, right) => Condition::all().add(left.to_expr().eq(right.to_expr())),
            Predicate::In(expr, values) => {
                let values: Vec<Value> = values.iter().map(TypedValue::to_value).collect();
                Condition::all().add(expr.to_expr().is_in(values))
            }
            Predicate::And(parts) => parts
                .iter()
                .fold(Condition::all(), |cond, part| cond.add(part.to_condition())),
            Predicate::Never => Condition::all().add(Expr::cust("FALSE")),
        }
    }

    /// Evaluate against a row, with SQL semantics: a null never equals
    /// anything except through an explicit null literal
    pub fn evaluate(&self, lookup: &dyn Fn(&ColumnRef) -> Option<Value>) -> bool {
        match self {
            Predicate::Eq(left, right) if right.is_null_literal() => {
                left.resolve(lookup).is_some_and(|v| v.is_null())
            }
            Predicate::Eq(left, right) if left.is_null_literal() => {
                right.resolve(lookup).is_some_and(|v| v.is_null())
            }
            Predicate::Eq(left, right) => match (left.resolve(lookup), right.resolve(lookup)) {
                (Some(l), Some(r)) => l.compare(&r) == Some(Ordering::Equal),
                _ => false,
            },
            Predicate::In(expr, values) => match expr.resolve(lookup) {
                Some(v) => values
                    .iter()
                    .any(|candidate| v.compare(candidate) == Some(Ordering::Equal)),
                None => false,
            },
            Predicate::And(parts) => parts.iter().all(|part| part.evaluate(lookup)),
            Predicate::Never => false,
        }
    }
}

impl FieldInfo {
    /// Typed reference to this field's column in `table`
    pub fn column_expr(&self, table: &str) -> Result<TypedExpr, AssociationError> {
        to_column_expression(self, table)
    }

    /// Typed reference to some other column, typed as this field
    ///
    /// Used for join keys: the column on the far side of the join is given the
    /// declared type of the field it is matched against.
    pub fn column_expr_at(&self, table: &str, column: &str) -> Result<TypedExpr, AssociationError> {
        comparable(self)?;
        Ok(TypedExpr::Column {
            column: ColumnRef::new(table, column),
            field_type: self.field_type(),
        })
    }
}

fn comparable(field: &FieldInfo) -> Result<(), AssociationError> {
    if field.field_type().is_comparable() {
        Ok(())
    } else {
        Err(AssociationError::UnsupportedType {
            field: field.name().to_string(),
            field_type: field.field_type(),
        })
    }
}

/// Typed literal for `value`, resolved through the field's declared type
///
/// # Errors
///
/// `UnsupportedType` if the field's type has no comparison mapping,
/// `TypeMismatch` if the value cannot represent that type.
pub fn to_expression(field: &FieldInfo, value: Value) -> Result<TypedExpr, AssociationError> {
    match TypedValue::coerce(field.field_type(), value) {
        Ok(typed) => Ok(TypedExpr::Literal(typed)),
        Err(ValueConversionError::Unsupported(field_type)) => Err(AssociationError::UnsupportedType {
            field: field.name().to_string(),
            field_type,
        }),
        Err(ValueConversionError::Mismatch { expected, actual }) => Err(AssociationError::TypeMismatch {
            field: field.name().to_string(),
            expected,
            actual,
        }),
    }
}

/// Typed reference to the field's column in `table`
pub fn to_column_expression(field: &FieldInfo, table: &str) -> Result<TypedExpr, AssociationError> {
    field.column_expr_at(table, field.column_name())
}

/// Equality between two typed expressions of the same field type
pub fn to_equality_expression(left: TypedExpr, right: TypedExpr) -> Result<Predicate, AssociationError> {
    if left.field_type() != right.field_type() {
        return Err(AssociationError::TypeMismatch {
            field: left.label(),
            expected: left.field_type(),
            actual: right.field_type().to_string(),
        });
    }
    Ok(Predicate::Eq(left, right))
}

/// Set membership; any value that cannot take the left side's type is an
/// `UnsupportedType` error
pub fn to_in_expression(left: TypedExpr, values: Vec<Value>) -> Result<Predicate, AssociationError> {
    let field_type = left.field_type();
    let typed = values
        .into_iter()
        .map(|value| TypedValue::coerce(field_type, value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AssociationError::UnsupportedType {
            field: left.label(),
            field_type,
        })?;
    Ok(Predicate::In(left, typed))
}
