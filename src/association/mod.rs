//! Associations between record types.
//!
//! An association binds an owner record to a target record type and turns
//! that binding into a [`Relation`] over the target's table, plus mutation
//! operations that keep foreign keys consistent:
//!
//! - [`BelongsTo`]: the owner holds the foreign key; resolves at most one target
//! - [`HasMany`]: the target holds the foreign key; resolves a collection
//! - [`HasManyThrough`]: an intermediate record holds both keys
//!
//! Associations are cheap to create and do nothing until asked. The target's
//! companion and base relation are resolved on first use and memoized in the
//! association instance; nothing is cached across instances.
//!
//! Declarations with convention-based foreign keys go through
//! [`Associations`].

pub mod belongs_to;
pub mod error;
pub mod has_many;
pub mod has_many_through;
pub mod naming;
pub mod support;

pub use belongs_to::{BelongsTo, BelongsToConfig};
pub use error::AssociationError;
pub use has_many::{HasMany, HasManyConfig};
pub use has_many_through::{HasManyThrough, HasManyThroughConfig};
pub use naming::{CamelCaseNaming, NamingConvention, SnakeCaseNaming};
pub use support::Associations;

use crate::executor::LifeExecutor;
use crate::model::{FieldInfo, Record, ID_FIELD};
use crate::query::expr::{to_equality_expression, to_expression, Predicate};
use crate::query::select::Relation;
use crate::registry::{RecordMeta, Registry};
use once_cell::unsync::OnceCell;
use sea_query::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lazily resolved state shared by every association kind
///
/// Holds the target type's companion and its base relation, each computed at
/// most once per instance. Not `Sync`; an association is used by one thread
/// at a time.
pub struct AssociationBase<'r, T> {
    registry: &'r Registry,
    companion: OnceCell<Arc<RecordMeta<T>>>,
    source: OnceCell<Relation<T>>,
}

impl<'r, T: Record> AssociationBase<'r, T> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            companion: OnceCell::new(),
            source: OnceCell::new(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Companion of the target type
    pub fn companion(&self) -> Result<&Arc<RecordMeta<T>>, AssociationError> {
        self.companion.get_or_try_init(|| {
            let meta = self.registry.companion::<T>()?;
            log::debug!("Resolved companion {} (table {})", meta.name(), meta.table());
            Ok::<_, AssociationError>(meta)
        })
    }

    /// Base relation over the target table, projecting every field
    pub fn source(&self) -> Result<Relation<T>, AssociationError> {
        self.source
            .get_or_try_init(|| Ok::<_, AssociationError>(Relation::new(Arc::clone(self.companion()?))))
            .cloned()
    }

    /// Field metadata by name
    ///
    /// # Errors
    ///
    /// `FieldNotFound` if the target type declares no such field.
    pub fn field(&self, name: &str) -> Result<&FieldInfo, AssociationError> {
        let meta = self.companion()?;
        meta.field(name)
            .ok_or_else(|| AssociationError::field_not_found(meta.name(), name))
    }

    pub fn id_field(&self) -> Result<&FieldInfo, AssociationError> {
        self.field(ID_FIELD)
    }

    /// Raw value of a named field on a record of the target type
    pub(crate) fn read(&self, record: &T, name: &str) -> Result<Value, AssociationError> {
        let meta = self.companion()?;
        self.field(name)?
            .get(record)
            .map_err(|e| AssociationError::from_model(meta.name(), e))
    }

    /// Write each entry of `conditions` into the matching field of `record`
    pub(crate) fn apply(&self, record: &mut T, conditions: &ConditionMap) -> Result<(), AssociationError> {
        let meta = self.companion()?;
        for (name, value) in conditions.iter() {
            self.field(name)?
                .set(record, value.clone())
                .map_err(|e| AssociationError::from_model(meta.name(), e))?;
        }
        Ok(())
    }

    /// One `column = value` equality per entry, resolved against the target's fields
    pub(crate) fn equalities(&self, conditions: &ConditionMap) -> Result<Vec<Predicate>, AssociationError> {
        let table = self.companion()?.table();
        conditions
            .iter()
            .map(|(name, value)| {
                let field = self.field(name)?;
                to_equality_expression(field.column_expr(table)?, to_expression(field, value.clone())?)
            })
            .collect()
    }
}

/// Common surface of every association kind
pub trait Association {
    type Owner: Record;
    type Target: Record;

    fn owner(&self) -> &Self::Owner;

    fn base(&self) -> &AssociationBase<'_, Self::Target>;

    /// The filter selecting the associated rows
    fn condition(&self) -> Result<Predicate, AssociationError>;

    /// The associated rows as a lazily evaluated relation
    fn relation(&self) -> Result<Relation<Self::Target>, AssociationError>;

    /// Execute [`Association::relation`] and materialize every record
    fn all<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<Vec<Self::Target>, AssociationError> {
        Ok(self.relation()?.all(executor)?)
    }
}

/// Equality constraints keyed by field name
///
/// ```rust
/// use lifeguard_assoc::ConditionMap;
///
/// let published = ConditionMap::new().with("published", true).with("lang", "en");
/// assert_eq!(published.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionMap(BTreeMap<String, Value>);

impl ConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add or replace an entry
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConditionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
