//! Execution methods for `Relation`.
//!
//! This module provides the methods that actually run a relation (`all`,
//! `first`, `count`, `iter`). Each one hands the relation's plan to a
//! `LifeExecutor` and materializes the returned rows through the record's
//! companion.

use crate::executor::{LifeError, LifeExecutor, Row};
use crate::model::Record;
use crate::query::select::Relation;
use crate::registry::RecordMeta;
use std::sync::Arc;

impl<T: Record> Relation<T> {
    /// Execute the relation and return every matching record
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use lifeguard_assoc::{LifeExecutor, Relation, Record};
    /// # fn run<T: Record>(relation: Relation<T>, executor: &dyn LifeExecutor) -> Result<(), lifeguard_assoc::LifeError> {
    /// let records = relation.all(executor)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn all<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<Vec<T>, LifeError> {
        self.iter(executor)?.collect()
    }

    /// Execute the relation limited to one row and return that record, if any
    ///
    /// Zero matching rows is `Ok(None)`, not an error. An existing limit
    /// below one is kept.
    pub fn first<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<Option<T>, LifeError> {
        let limit = self.query().limit.map_or(1, |limit| limit.min(1));
        let mut iter = self.clone().limit(limit).iter(executor)?;
        iter.next().transpose()
    }

    /// Number of rows the relation yields
    pub fn count<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<u64, LifeError> {
        executor.count(self.query())
    }

    /// Execute the relation and iterate the results, materializing each
    /// record as it is reached
    pub fn iter<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<RecordIter<T>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("lifeguard.relation", table = %self.meta().table()).entered();

        log::trace!("Executing relation over {}: {}", self.meta().table(), self.to_sql());
        let rows = executor.fetch(self.query())?;
        Ok(RecordIter {
            meta: Arc::clone(self.meta()),
            rows: rows.into_iter(),
        })
    }
}

/// Iterator over the records of an executed relation
pub struct RecordIter<T> {
    meta: Arc<RecordMeta<T>>,
    rows: std::vec::IntoIter<Row>,
}

impl<T: Record> Iterator for RecordIter<T> {
    type Item = Result<T, LifeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            self.meta
                .from_row(&row)
                .map_err(|e| LifeError::ParseError(format!("Failed to parse row: {}", e))),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: Record> ExactSizeIterator for RecordIter<T> {}
