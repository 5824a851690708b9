//! In-process executor.
//!
//! `MemoryExecutor` stores rows per table and evaluates `RelationQuery` plans
//! directly: inner joins as nested loops, filters with SQL null semantics,
//! ordering with nulls last for ascending and first for descending, then the
//! limit and the projection. Rows saved with a null primary key get the next
//! integer or a fresh v4 UUID. Transactions are a stack of table snapshots.
//!
//! Useful for tests and for embedding associations without a database.

use crate::executor::{LifeError, LifeExecutor, Row};
use crate::model::FieldInfo;
use crate::query::expr::ColumnRef;
use crate::query::select::{Direction, RelationQuery};
use crate::value::field_type::is_null;
use crate::value::{FieldType, TypedValue};
use sea_query::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Tables = BTreeMap<String, Vec<Row>>;

#[derive(Debug, Default)]
struct MemoryState {
    tables: Tables,
    snapshots: Vec<Tables>,
}

/// A `LifeExecutor` keeping every table in memory
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: Mutex<MemoryState>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every stored row of `table`, in insertion order
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Store a row as-is, bypassing key assignment
    pub fn insert_row(&self, table: &str, row: Row) {
        self.state()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Number of open transaction scopes
    pub fn depth(&self) -> usize {
        self.state().snapshots.len()
    }
}

fn same_key(field_type: FieldType, a: &Value, b: &Value) -> bool {
    match (
        TypedValue::coerce(field_type, a.clone()),
        TypedValue::coerce(field_type, b.clone()),
    ) {
        (Ok(a), Ok(b)) => a.compare(&b) == Some(Ordering::Equal),
        _ => false,
    }
}

fn next_key(key: &FieldInfo, rows: &[Row]) -> Result<Value, LifeError> {
    match key.field_type() {
        FieldType::Integer | FieldType::BigInteger => {
            let max = rows
                .iter()
                .filter_map(|row| row.get(key.column_name()))
                .filter_map(|v| match TypedValue::coerce(FieldType::BigInteger, v.clone()) {
                    Ok(TypedValue::BigInteger(Some(n))) => Some(n),
                    _ => None,
                })
                .max()
                .unwrap_or(0);
            TypedValue::coerce(key.field_type(), Value::BigInt(Some(max + 1)))
                .map(|typed| typed.to_value())
                .map_err(|e| LifeError::Other(format!("Cannot assign key {}: {}", key.name(), e)))
        }
        FieldType::Uuid => Ok(Value::from(uuid::Uuid::new_v4())),
        other => Err(LifeError::Other(format!(
            "Cannot assign a {} primary key for {}",
            other,
            key.name()
        ))),
    }
}

fn table_rows<'s>(tables: &'s Tables, table: &str) -> &'s [Row] {
    tables.get(table).map(Vec::as_slice).unwrap_or(&[])
}

fn compare_rows(a: Option<&Value>, b: Option<&Value>, field_type: FieldType, direction: Direction) -> Ordering {
    let typed = |v: Option<&Value>| {
        v.and_then(|v| TypedValue::coerce(field_type, v.clone()).ok())
            .filter(|t| !t.is_null())
    };
    match (typed(a), typed(b), direction) {
        (Some(a), Some(b), Direction::Asc) => a.compare(&b).unwrap_or(Ordering::Equal),
        (Some(a), Some(b), Direction::Desc) => b.compare(&a).unwrap_or(Ordering::Equal),
        (None, None, _) => Ordering::Equal,
        (None, Some(_), Direction::Asc) | (Some(_), None, Direction::Desc) => Ordering::Greater,
        (Some(_), None, Direction::Asc) | (None, Some(_), Direction::Desc) => Ordering::Less,
    }
}

impl LifeExecutor for MemoryExecutor {
    fn fetch(&self, query: &RelationQuery) -> Result<Vec<Row>, LifeError> {
        let state = self.state();
        let tables = &state.tables;

        // Each candidate maps table name to the row it contributes
        let mut candidates: Vec<BTreeMap<&str, &Row>> = table_rows(tables, &query.table)
            .iter()
            .map(|row| BTreeMap::from([(query.table.as_str(), row)]))
            .collect();

        for join in &query.joins {
            let mut joined = Vec::new();
            for candidate in &candidates {
                for row in table_rows(tables, &join.table) {
                    let mut next = candidate.clone();
                    next.insert(join.table.as_str(), row);
                    let lookup = |col: &ColumnRef| {
                        next.get(col.table()).and_then(|r| r.get(col.column())).cloned()
                    };
                    if join.on.evaluate(&lookup) {
                        joined.push(next);
                    }
                }
            }
            candidates = joined;
        }

        let condition = query.condition();
        candidates.retain(|candidate| {
            let lookup = |col: &ColumnRef| {
                candidate.get(col.table()).and_then(|r| r.get(col.column())).cloned()
            };
            condition.evaluate(&lookup)
        });

        for order in query.order_by.iter().rev() {
            candidates.sort_by(|a, b| {
                let value = |c: &BTreeMap<&str, &Row>| {
                    c.get(order.column.table())
                        .and_then(|r| r.get(order.column.column()))
                        .cloned()
                };
                compare_rows(value(a).as_ref(), value(b).as_ref(), order.field_type, order.direction)
            });
        }

        if let Some(limit) = query.limit {
            candidates.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(candidates
            .iter()
            .filter_map(|candidate| candidate.get(query.table.as_str()))
            .map(|row| {
                query
                    .fields
                    .iter()
                    .filter_map(|f| {
                        row.get(f.column_name())
                            .map(|v| (f.column_name().to_string(), v.clone()))
                    })
                    .collect()
            })
            .collect())
    }

    fn upsert(
        &self,
        table: &str,
        key: &FieldInfo,
        fields: &[FieldInfo],
        row: &Row,
    ) -> Result<Row, LifeError> {
        let mut state = self.state();
        let rows = state.tables.entry(table.to_string()).or_default();

        let mut incoming = row.clone();
        let key_value = match incoming.get(key.column_name()) {
            Some(value) if !is_null(value) => value.clone(),
            _ => {
                let value = next_key(key, rows)?;
                incoming.insert(key.column_name().to_string(), value.clone());
                value
            }
        };

        let existing = rows.iter_mut().find(|stored| {
            stored
                .get(key.column_name())
                .is_some_and(|v| same_key(key.field_type(), v, &key_value))
        });
        let stored = match existing {
            Some(stored) => {
                stored.extend(incoming);
                stored.clone()
            }
            None => {
                rows.push(incoming.clone());
                incoming
            }
        };
        log::trace!("Stored row in {}: {:?}", table, stored);

        Ok(fields
            .iter()
            .filter_map(|f| {
                stored
                    .get(f.column_name())
                    .map(|v| (f.column_name().to_string(), v.clone()))
            })
            .collect())
    }

    fn delete(&self, table: &str, key: &FieldInfo, value: &Value) -> Result<u64, LifeError> {
        let mut state = self.state();
        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| {
            !row.get(key.column_name())
                .is_some_and(|v| same_key(key.field_type(), v, value))
        });
        Ok((before - rows.len()) as u64)
    }

    fn begin(&self) -> Result<(), LifeError> {
        let mut state = self.state();
        let snapshot = state.tables.clone();
        state.snapshots.push(snapshot);
        Ok(())
    }

    fn commit(&self) -> Result<(), LifeError> {
        self.state()
            .snapshots
            .pop()
            .map(|_| ())
            .ok_or_else(|| LifeError::Other("No transaction in progress".to_string()))
    }

    fn rollback(&self) -> Result<(), LifeError> {
        let mut state = self.state();
        let snapshot = state
            .snapshots
            .pop()
            .ok_or_else(|| LifeError::Other("No transaction in progress".to_string()))?;
        state.tables = snapshot;
        Ok(())
    }
}
