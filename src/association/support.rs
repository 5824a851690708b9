//! Declaring associations.
//!
//! [`Associations`] is the builder record types use to declare their
//! relationships. It holds the registry and a naming convention and resolves
//! omitted foreign keys through that convention:
//!
//! | declaration        | foreign key default       | association foreign key default |
//! |--------------------|---------------------------|---------------------------------|
//! | `belongs_to`       | from the target's name    |                                 |
//! | `has_many`         | from the owner's name     |                                 |
//! | `has_many_through` | from the owner's name     | from the target's name          |
//!
//! Every call returns a fresh association; nothing is memoized here.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Blog { id: Option<i64>, author_id: Option<i64> }
//!
//! impl Blog {
//!     fn posts<'a>(&'a self, assoc: &Associations<'a>) -> Result<HasMany<'a, Blog, Post>, AssociationError> {
//!         assoc.has_many::<Post, _>(self)
//!     }
//! }
//! ```

use super::{
    AssociationError, BelongsTo, BelongsToConfig, ConditionMap, HasMany, HasManyConfig,
    HasManyThrough, HasManyThroughConfig, NamingConvention, SnakeCaseNaming,
};
use crate::config::NamingConfig;
use crate::model::Record;
use crate::registry::Registry;

/// Association declaration builder
pub struct Associations<'r> {
    registry: &'r Registry,
    naming: Box<dyn NamingConvention + 'r>,
}

impl<'r> Associations<'r> {
    /// Builder using [`SnakeCaseNaming`] with the `_id` suffix
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            naming: Box::new(SnakeCaseNaming::default()),
        }
    }

    /// Builder using the naming settings from configuration
    pub fn from_config(registry: &'r Registry, config: &NamingConfig) -> Self {
        Self::new(registry).with_naming(SnakeCaseNaming::from_config(config))
    }

    /// Replace the naming convention
    pub fn with_naming(mut self, naming: impl NamingConvention + 'r) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Conventional foreign key for record type `X`
    pub fn foreign_key_for<X: Record>(&self) -> Result<String, AssociationError> {
        let meta = self.registry.companion::<X>()?;
        Ok(self.naming.foreign_key(meta.name()))
    }

    /// `owner` belongs to a `T`, keyed by the conventional foreign key for `T`
    pub fn belongs_to<'a, T, O>(&self, owner: &'a mut O) -> Result<BelongsTo<'a, O, T>, AssociationError>
    where
        'r: 'a,
        T: Record,
        O: Record,
    {
        let foreign_key = self.foreign_key_for::<T>()?;
        Ok(self.belongs_to_with_key(owner, &foreign_key))
    }

    /// `owner` belongs to a `T` through an explicit foreign key on the owner
    pub fn belongs_to_with_key<'a, T, O>(&self, owner: &'a mut O, foreign_key: &str) -> BelongsTo<'a, O, T>
    where
        'r: 'a,
        T: Record,
        O: Record,
    {
        BelongsTo::new(self.registry, owner, BelongsToConfig::new(foreign_key))
    }

    /// `owner` has many `T`, keyed by the conventional foreign key for the owner
    pub fn has_many<'a, T, O>(&self, owner: &'a O) -> Result<HasMany<'a, O, T>, AssociationError>
    where
        'r: 'a,
        T: Record,
        O: Record,
    {
        self.has_many_with(owner, ConditionMap::new(), None)
    }

    /// `owner` has many `T` matching `conditions`; `foreign_key` defaults to
    /// the conventional key for the owner
    pub fn has_many_with<'a, T, O>(
        &self,
        owner: &'a O,
        conditions: ConditionMap,
        foreign_key: Option<&str>,
    ) -> Result<HasMany<'a, O, T>, AssociationError>
    where
        'r: 'a,
        T: Record,
        O: Record,
    {
        let foreign_key = match foreign_key {
            Some(key) => key.to_string(),
            None => self.foreign_key_for::<O>()?,
        };
        let config = HasManyConfig::new(foreign_key).with_conditions(conditions);
        Ok(HasMany::new(self.registry, owner, config))
    }

    /// The owner has many `T` through the intermediates of `through`
    ///
    /// `foreign_key` (intermediate → owner) defaults to the conventional key
    /// for the owner, `association_foreign_key` (intermediate → target) to the
    /// conventional key for `T`.
    pub fn has_many_through<'a, T, O, I>(
        &self,
        through: HasMany<'a, O, I>,
        conditions: ConditionMap,
        foreign_key: Option<&str>,
        association_foreign_key: Option<&str>,
    ) -> Result<HasManyThrough<'a, O, T, I>, AssociationError>
    where
        'r: 'a,
        T: Record,
        O: Record,
        I: Record,
    {
        let foreign_key = match foreign_key {
            Some(key) => key.to_string(),
            None => self.foreign_key_for::<O>()?,
        };
        let association_foreign_key = match association_foreign_key {
            Some(key) => key.to_string(),
            None => self.foreign_key_for::<T>()?,
        };
        let config = HasManyThroughConfig::new(foreign_key, association_foreign_key)
            .with_conditions(conditions);
        Ok(HasManyThrough::new(self.registry, through, config))
    }
}

impl std::fmt::Debug for Associations<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Associations")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
