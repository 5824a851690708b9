//! Has-many: each target record holds a foreign key naming the owner.

use super::{Association, AssociationBase, AssociationError, ConditionMap};
use crate::executor::LifeExecutor;
use crate::model::{Record, ID_FIELD};
use crate::persistence::save;
use crate::query::expr::{to_equality_expression, to_expression, Predicate};
use crate::query::select::Relation;
use crate::registry::{RecordMeta, Registry};
use crate::transaction::run_in_transaction;
use sea_query::Value;

/// Resolved settings of a has-many association
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HasManyConfig {
    /// Extra equality constraints on the target
    pub conditions: ConditionMap,
    /// Field on the target holding the owner's id
    pub foreign_key: String,
}

impl HasManyConfig {
    pub fn new(foreign_key: impl Into<String>) -> Self {
        Self {
            conditions: ConditionMap::new(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn with_conditions(mut self, conditions: ConditionMap) -> Self {
        self.conditions = conditions;
        self
    }
}

/// The target records whose foreign key names the owner
///
/// # Example
///
/// ```rust,ignore
/// let posts = associations.has_many::<Post, _>(&blog)?;
/// let mut draft = posts.build()?;          // blog_id already set
/// draft.title = "Hello".into();
/// posts.associate(&executor, &mut draft)?; // saved inside a transaction
/// assert_eq!(posts.all(&executor)?.len(), 1);
/// ```
pub struct HasMany<'a, O, T> {
    owner: &'a O,
    config: HasManyConfig,
    owner_base: AssociationBase<'a, O>,
    base: AssociationBase<'a, T>,
}

impl<'a, O: Record, T: Record> HasMany<'a, O, T> {
    pub fn new(registry: &'a Registry, owner: &'a O, config: HasManyConfig) -> Self {
        Self {
            owner,
            config,
            owner_base: AssociationBase::new(registry),
            base: AssociationBase::new(registry),
        }
    }

    pub fn config(&self) -> &HasManyConfig {
        &self.config
    }

    /// The owner's id
    pub fn owner_id(&self) -> Result<Value, AssociationError> {
        self.owner_base.read(self.owner, ID_FIELD)
    }

    /// The configured conditions plus `foreign_key = owner.id`
    ///
    /// The foreign key is inserted last, so it replaces a same-named entry in
    /// the configured conditions.
    pub fn effective_conditions(&self) -> Result<ConditionMap, AssociationError> {
        let mut conditions = self.config.conditions.clone();
        conditions.insert(self.config.foreign_key.clone(), self.owner_id()?);
        Ok(conditions)
    }

    /// `target.<foreign_key> = owner.id`, or [`Predicate::Never`] while the
    /// owner has no id
    fn foreign_key_predicate(&self) -> Result<Predicate, AssociationError> {
        let table = self.base.companion()?.table();
        let field = self.base.field(&self.config.foreign_key)?;
        let column = field.column_expr(table)?;
        let owner_id = to_expression(field, self.owner_id()?)?;
        if owner_id.is_null_literal() {
            log::debug!("Owner of {}.{} has no id", table, field.name());
            return Ok(Predicate::Never);
        }
        to_equality_expression(column, owner_id)
    }

    /// A new, unsaved target with every effective condition applied
    pub fn build(&self) -> Result<T, AssociationError> {
        let mut target = self.base.companion()?.new_instance();
        self.assign(&mut target)?;
        Ok(target)
    }

    /// Set every effective-condition field on `target`
    ///
    /// Only the in-memory record changes; nothing is persisted.
    pub fn assign<'t>(&self, target: &'t mut T) -> Result<&'t mut T, AssociationError> {
        let conditions = self.effective_conditions()?;
        self.base.apply(target, &conditions)?;
        Ok(target)
    }

    /// Assign then save `target` inside one transaction
    ///
    /// Returns what the save reported. The in-memory assignment stays even if
    /// the transaction rolls back.
    pub fn associate<Ex: LifeExecutor + ?Sized>(
        &self,
        executor: &Ex,
        target: &mut T,
    ) -> Result<bool, AssociationError> {
        let meta: &RecordMeta<T> = self.base.companion()?;
        run_in_transaction(executor, |executor| {
            self.assign(target)?;
            save(executor, meta, target)
        })
    }
}

impl<'a, O: Record, T: Record> Association for HasMany<'a, O, T> {
    type Owner = O;
    type Target = T;

    fn owner(&self) -> &O {
        self.owner
    }

    fn base(&self) -> &AssociationBase<'_, T> {
        &self.base
    }

    /// Conjunction of one equality per effective condition
    ///
    /// An owner without an id matches nothing: the foreign-key equality is
    /// never rewritten to `IS NULL`.
    fn condition(&self) -> Result<Predicate, AssociationError> {
        let mut conditions = self.config.conditions.clone();
        conditions.remove(&self.config.foreign_key);
        let mut parts = self.base.equalities(&conditions)?;
        parts.push(self.foreign_key_predicate()?);
        Ok(Predicate::and(parts))
    }

    fn relation(&self) -> Result<Relation<T>, AssociationError> {
        Ok(self.base.source()?.filter(self.condition()?))
    }
}
