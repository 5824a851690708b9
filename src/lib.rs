//! # Lifeguard associations
//!
//! Declarative relationships between Lifeguard record types, evaluated as
//! composable relations over a coroutine-safe PostgreSQL executor.
//!
//! - **belongs_to**: the owner holds a foreign key to one target record
//! - **has_many**: many targets hold a foreign key naming the owner
//! - **has_many_through**: targets linked to the owner by intermediate records
//!
//! Record types describe themselves once through a [`RecordMeta`] companion
//! registered in a [`Registry`]; associations look up field metadata there
//! and build typed comparison expressions from it. Queries run through any
//! [`LifeExecutor`]: [`MayPostgresExecutor`] against PostgreSQL, or
//! [`MemoryExecutor`] for tests and embedded use.
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard) for the
//! surrounding ORM.

pub mod association;
pub mod config;
pub mod connection;
pub mod executor;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod persistence;
pub mod query;
pub mod registry;
pub mod transaction;
pub mod value;

pub use association::{
    Association, AssociationError, Associations, BelongsTo, BelongsToConfig, CamelCaseNaming,
    ConditionMap, HasMany, HasManyConfig, HasManyThrough, HasManyThroughConfig, NamingConvention,
    SnakeCaseNaming,
};
pub use config::{DatabaseConfig, LifeguardConfig, NamingConfig};
pub use connection::{connect, ConnectionError};
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor, Row};
pub use memory::MemoryExecutor;
pub use model::{extract, FieldInfo, ModelError, Record, ID_FIELD};
pub use persistence::{destroy, save};
pub use query::{Direction, Predicate, Relation};
pub use registry::{RecordMeta, Registry};
pub use transaction::run_in_transaction;
pub use value::{FieldType, TypedValue, ValueType};
