//! Has-many-through: targets linked to the owner by intermediate records.
//!
//! The owner has many intermediate records (`through`), and each intermediate
//! names one target through its association foreign key. The relation joins
//! the target table to the intermediate table on
//! `target.id = intermediate.<association_foreign_key>` and keeps the rows
//! whose intermediate belongs to the owner.

use super::{Association, AssociationBase, AssociationError, ConditionMap, HasMany};
use crate::executor::LifeExecutor;
use crate::model::{Record, ID_FIELD};
use crate::persistence::save;
use crate::query::expr::{to_equality_expression, Predicate};
use crate::query::select::Relation;
use crate::registry::{RecordMeta, Registry};
use crate::transaction::run_in_transaction;

/// Resolved settings of a has-many-through association
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HasManyThroughConfig {
    /// Extra equality constraints on the target
    pub conditions: ConditionMap,
    /// Field on the intermediate holding the owner's id
    pub foreign_key: String,
    /// Field on the intermediate holding the target's id
    pub association_foreign_key: String,
}

impl HasManyThroughConfig {
    pub fn new(foreign_key: impl Into<String>, association_foreign_key: impl Into<String>) -> Self {
        Self {
            conditions: ConditionMap::new(),
            foreign_key: foreign_key.into(),
            association_foreign_key: association_foreign_key.into(),
        }
    }

    pub fn with_conditions(mut self, conditions: ConditionMap) -> Self {
        self.conditions = conditions;
        self
    }
}

/// Targets reachable from the owner through intermediate records of type `I`
///
/// # Example
///
/// ```rust,ignore
/// let post_tags = associations.has_many::<PostTag, _>(&post)?;
/// let tags = associations.has_many_through::<Tag, _, _>(post_tags, ConditionMap::new(), None, None)?;
/// tags.associate(&executor, &mut rust_tag)?; // saves a PostTag row
/// assert_eq!(tags.all(&executor)?, vec![rust_tag]);
/// ```
pub struct HasManyThrough<'a, O, T, I> {
    through: HasMany<'a, O, I>,
    config: HasManyThroughConfig,
    base: AssociationBase<'a, T>,
}

impl<'a, O: Record, T: Record, I: Record> HasManyThrough<'a, O, T, I> {
    pub fn new(registry: &'a Registry, through: HasMany<'a, O, I>, config: HasManyThroughConfig) -> Self {
        Self {
            through,
            config,
            base: AssociationBase::new(registry),
        }
    }

    pub fn config(&self) -> &HasManyThroughConfig {
        &self.config
    }

    /// The owner-to-intermediate association
    pub fn through(&self) -> &HasMany<'a, O, I> {
        &self.through
    }

    /// Apply the target conditions to `target` and build the unsaved
    /// intermediate linking it to the owner
    ///
    /// Returns the intermediate, which is the record to persist. The target
    /// is mutated in memory only.
    pub fn assign(&self, target: &mut T) -> Result<I, AssociationError> {
        self.base.apply(target, &self.config.conditions)?;

        let intermediate_base = self.through.base();
        let intermediate_meta = intermediate_base.companion()?;
        let mut link = intermediate_meta.new_instance();

        let owner_id = self.through.owner_id()?;
        let target_id = self.base.read(target, ID_FIELD)?;
        for (field, value) in [
            (&self.config.foreign_key, owner_id),
            (&self.config.association_foreign_key, target_id),
        ] {
            intermediate_base
                .field(field)?
                .set(&mut link, value)
                .map_err(|e| AssociationError::from_model(intermediate_meta.name(), e))?;
        }
        Ok(link)
    }

    /// Assign, then save the intermediate inside one transaction
    pub fn associate<Ex: LifeExecutor + ?Sized>(
        &self,
        executor: &Ex,
        target: &mut T,
    ) -> Result<bool, AssociationError> {
        let intermediate_meta: &RecordMeta<I> = self.through.base().companion()?;
        run_in_transaction(executor, |executor| {
            let mut link = self.assign(target)?;
            save(executor, intermediate_meta, &mut link)
        })
    }
}

impl<'a, O: Record, T: Record, I: Record> Association for HasManyThrough<'a, O, T, I> {
    type Owner = O;
    type Target = T;

    fn owner(&self) -> &O {
        self.through.owner()
    }

    fn base(&self) -> &AssociationBase<'_, T> {
        &self.base
    }

    /// The through condition AND one equality per target condition
    fn condition(&self) -> Result<Predicate, AssociationError> {
        let mut parts = vec![self.through.condition()?];
        parts.extend(self.base.equalities(&self.config.conditions)?);
        Ok(Predicate::and(parts))
    }

    fn relation(&self) -> Result<Relation<T>, AssociationError> {
        let intermediate_base = self.through.base();
        let intermediate_meta: &RecordMeta<I> = intermediate_base.companion()?;
        let association_key = intermediate_base.field(&self.config.association_foreign_key)?;
        let id = self.base.id_field()?;

        // Both sides typed by the target's id field
        let joined = self.base.source()?.join_with(intermediate_meta, |target, intermediate| {
            to_equality_expression(
                id.column_expr(target.table())?,
                id.column_expr_at(intermediate.table(), association_key.column_name())?,
            )
        })?;
        Ok(joined.filter(self.condition()?))
    }
}
