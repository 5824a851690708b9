//! Belongs-to: the owner holds a foreign key naming one target record.

use super::{Association, AssociationBase, AssociationError};
use crate::executor::LifeExecutor;
use crate::model::{FieldInfo, Record};
use crate::query::expr::{to_equality_expression, to_expression, Predicate};
use crate::query::select::Relation;
use crate::registry::Registry;

/// Resolved settings of a belongs-to association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BelongsToConfig {
    /// Field on the owner holding the target's id
    pub foreign_key: String,
}

impl BelongsToConfig {
    pub fn new(foreign_key: impl Into<String>) -> Self {
        Self {
            foreign_key: foreign_key.into(),
        }
    }
}

/// The target record an owner points at through its foreign key
///
/// Borrows the owner mutably so that [`BelongsTo::assign`] can update the
/// foreign key in place.
///
/// # Example
///
/// ```rust,ignore
/// let mut blog = Blog { id: Some(1), author_id: None, ..Default::default() };
/// let mut author_of = associations.belongs_to::<Author, _>(&mut blog)?;
/// author_of.assign(&ada)?;
/// let author = author_of.get(&executor)?;
/// ```
pub struct BelongsTo<'a, O, T> {
    owner: &'a mut O,
    config: BelongsToConfig,
    owner_base: AssociationBase<'a, O>,
    base: AssociationBase<'a, T>,
}

impl<'a, O: Record, T: Record> BelongsTo<'a, O, T> {
    pub fn new(registry: &'a Registry, owner: &'a mut O, config: BelongsToConfig) -> Self {
        Self {
            owner,
            config,
            owner_base: AssociationBase::new(registry),
            base: AssociationBase::new(registry),
        }
    }

    pub fn config(&self) -> &BelongsToConfig {
        &self.config
    }

    /// The foreign-key field on the owner type
    pub fn foreign_key_field(&self) -> Result<&FieldInfo, AssociationError> {
        self.owner_base.field(&self.config.foreign_key)
    }

    /// Load the target, if one with the owner's foreign key exists
    ///
    /// Zero rows is `Ok(None)`. Should several rows match, the first one the
    /// store returns wins.
    pub fn get<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<Option<T>, AssociationError> {
        Ok(self.relation()?.first(executor)?)
    }

    /// Point the owner at `target` by copying `target.id` into the foreign key
    ///
    /// Only the in-memory owner changes; nothing is persisted.
    pub fn assign<'t>(&mut self, target: &'t T) -> Result<&'t T, AssociationError> {
        let id = self.base.read(target, crate::model::ID_FIELD)?;
        let owner_name = self.owner_base.companion()?.name();
        let foreign_key = self.owner_base.field(&self.config.foreign_key)?;
        foreign_key
            .set(&mut *self.owner, id)
            .map_err(|e| AssociationError::from_model(owner_name, e))?;
        Ok(target)
    }
}

impl<'a, O: Record, T: Record> Association for BelongsTo<'a, O, T> {
    type Owner = O;
    type Target = T;

    fn owner(&self) -> &O {
        &*self.owner
    }

    fn base(&self) -> &AssociationBase<'_, T> {
        &self.base
    }

    /// `target.id == owner.<foreign_key>`, typed as the target's id
    fn condition(&self) -> Result<Predicate, AssociationError> {
        let owner_name = self.owner_base.companion()?.name();
        let key = self
            .foreign_key_field()?
            .get(&*self.owner)
            .map_err(|e| AssociationError::from_model(owner_name, e))?;

        let table = self.base.companion()?.table();
        let id = self.base.id_field()?;
        to_equality_expression(id.column_expr(table)?, to_expression(id, key)?)
    }

    /// Base relation filtered by [`condition`](Self::condition), at most one row
    fn relation(&self) -> Result<Relation<T>, AssociationError> {
        Ok(self.base.source()?.filter(self.condition()?).limit(1))
    }
}
