//! Query module for association relations.
//!
//! This module provides the relation algebra associations compose against:
//! - **Expr**: typed comparison expressions and predicates (expression conversion)
//! - **Select**: `Relation<T>`, an immutable, lazily-evaluated query over a record table
//! - **Execution**: running a relation through a `LifeExecutor` and materializing records
//! - **Value conversion**: binding `sea_query` values as `may_postgres` parameters

pub mod execution;
pub mod expr;
pub mod select;
pub mod value_conversion;

pub use execution::RecordIter;
pub use expr::{
    to_column_expression, to_equality_expression, to_expression, to_in_expression, ColumnRef,
    Predicate, TypedExpr,
};
pub use select::{Direction, JoinClause, OrderClause, Relation, RelationQuery};
