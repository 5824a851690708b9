//! Relations: immutable, lazily-evaluated queries over a record table.
//!
//! A [`Relation`] is a base source (the target record's table, projecting
//! every declared field) plus joins, filters, ordering and a limit. Building a
//! relation never touches storage; execution lives in the execution module.
//! Every combinator consumes the relation and returns a new one, so a
//! relation handed out earlier is never affected by later composition.

use super::expr::{ColumnRef, Predicate};
use crate::association::AssociationError;
use crate::model::{FieldInfo, Record};
use crate::registry::RecordMeta;
use crate::value::FieldType;
use sea_query::{DynIden, JoinType, Order, PostgresQueryBuilder, Query, SelectStatement, Values};
use std::sync::Arc;

/// Sort direction for [`Relation::order_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// An inner join onto another table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub on: Predicate,
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: ColumnRef,
    pub field_type: FieldType,
    pub direction: Direction,
}

/// Backend-neutral query plan behind a relation
///
/// Executors either render it to SQL with [`RelationQuery::to_statement`] or
/// evaluate it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationQuery {
    pub table: String,
    pub fields: Vec<FieldInfo>,
    pub joins: Vec<JoinClause>,
    pub filters: Vec<Predicate>,
    pub order_by: Vec<OrderClause>,
    pub limit: Option<u64>,
}

impl RelationQuery {
    /// Plan selecting every field of `table`
    pub fn new(table: impl Into<String>, fields: Vec<FieldInfo>) -> Self {
        Self {
            table: table.into(),
            fields,
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// The conjunction of every filter
    pub fn condition(&self) -> Predicate {
        Predicate::and(self.filters.iter().cloned())
    }

    /// Render as a `sea_query` SELECT
    pub fn to_statement(&self) -> SelectStatement {
        let mut query = Query::select();
        for field in &self.fields {
            query.column((
                DynIden::from(self.table.clone()),
                DynIden::from(field.column_name().to_string()),
            ));
        }
        query.from(DynIden::from(self.table.clone()));

        for join in &self.joins {
            query.join(
                JoinType::InnerJoin,
                DynIden::from(join.table.clone()),
                join.on.to_condition(),
            );
        }
        if !self.filters.is_empty() {
            query.cond_where(self.condition().to_condition());
        }
        for order in &self.order_by {
            query.order_by(
                (
                    DynIden::from(order.column.table().to_string()),
                    DynIden::from(order.column.column().to_string()),
                ),
                Order::from(order.direction),
            );
        }
        if let Some(limit) = self.limit {
            query.limit(limit);
        }
        query
    }

    /// SQL text and bound values for PostgreSQL
    pub fn build(&self) -> (String, Values) {
        self.to_statement().build(PostgresQueryBuilder)
    }

    /// SQL text with values inlined, for logging and inspection
    pub fn to_sql(&self) -> String {
        self.to_statement().to_string(PostgresQueryBuilder)
    }
}

/// A lazily evaluated query returning records of type `T`
///
/// # Example
///
/// ```rust
/// # use lifeguard_assoc::{extract, ModelError, Record, ValueType};
/// # use sea_query::Value;
/// # #[derive(Clone, Debug, Default)]
/// # struct Post { id: Option<i64> }
/// # impl Record for Post {
/// #     fn get(&self, f: &str) -> Option<Value> { (f == "id").then(|| self.id.into_value()) }
/// #     fn set(&mut self, f: &str, v: Value) -> Result<(), ModelError> { self.id = extract(f, v)?; Ok(()) }
/// # }
/// use lifeguard_assoc::{FieldInfo, FieldType, RecordMeta, Relation};
/// use std::sync::Arc;
///
/// let posts = Arc::new(
///     RecordMeta::new("Post", "posts", Post::default)
///         .with_field(FieldInfo::new("id", FieldType::BigInteger)),
/// );
/// let first_ten = Relation::new(posts).limit(10);
/// assert_eq!(first_ten.to_sql(), r#"SELECT "posts"."id" FROM "posts" LIMIT 10"#);
/// ```
pub struct Relation<T> {
    meta: Arc<RecordMeta<T>>,
    query: RelationQuery,
}

impl<T> Clone for Relation<T> {
    fn clone(&self) -> Self {
        Self {
            meta: Arc::clone(&self.meta),
            query: self.query.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Relation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("record", &self.meta.name())
            .field("query", &self.query)
            .finish()
    }
}

impl<T: Record> Relation<T> {
    /// Base relation over the record's table, projecting every declared field
    pub fn new(meta: Arc<RecordMeta<T>>) -> Self {
        let query = RelationQuery::new(meta.table(), meta.fields().to_vec());
        Self { meta, query }
    }

    /// Add a filter; filters combine with AND
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.query.filters.push(predicate);
        self
    }

    /// Inner join `table` on `on`
    pub fn join(mut self, table: impl Into<String>, on: Predicate) -> Self {
        self.query.joins.push(JoinClause {
            table: table.into(),
            on,
        });
        self
    }

    /// Inner join the table of another record type, building the join
    /// predicate from both companions
    pub fn join_with<I, F>(self, other: &RecordMeta<I>, on: F) -> Result<Self, AssociationError>
    where
        I: Record,
        F: FnOnce(&RecordMeta<T>, &RecordMeta<I>) -> Result<Predicate, AssociationError>,
    {
        let predicate = on(&self.meta, other)?;
        Ok(self.join(other.table(), predicate))
    }

    /// Keep at most `limit` rows
    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Order by one of the record's fields
    ///
    /// # Errors
    ///
    /// `FieldNotFound` if the record has no such field, `UnsupportedType` if
    /// the field's type cannot be compared.
    pub fn order_by(mut self, field: &str, direction: Direction) -> Result<Self, AssociationError> {
        let info = self
            .meta
            .field(field)
            .ok_or_else(|| AssociationError::field_not_found(self.meta.name(), field))?;
        let column = info.column_expr(self.meta.table())?;
        let field_type = column.field_type();
        let column = ColumnRef::new(self.meta.table(), info.column_name());
        self.query.order_by.push(OrderClause {
            column,
            field_type,
            direction,
        });
        Ok(self)
    }

    pub fn meta(&self) -> &Arc<RecordMeta<T>> {
        &self.meta
    }

    pub fn query(&self) -> &RelationQuery {
        &self.query
    }

    pub fn to_statement(&self) -> SelectStatement {
        self.query.to_statement()
    }

    pub fn to_sql(&self) -> String {
        self.query.to_sql()
    }
}
