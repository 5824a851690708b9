//! Record companions and the type registry.
//!
//! Every record type has a companion, [`RecordMeta`], describing its table, its
//! fields and how to create a blank instance. Companions are registered once at
//! startup in a [`Registry`] keyed by the record's `TypeId`; associations look
//! them up from there instead of reflecting over the type.
//!
//! # Example
//!
//! ```rust
//! use lifeguard_assoc::{FieldInfo, FieldType, RecordMeta, Registry};
//! # use lifeguard_assoc::{extract, ModelError, Record, ValueType};
//! # use sea_query::Value;
//! # #[derive(Clone, Debug, Default)]
//! # struct Blog { id: Option<i64> }
//! # impl Record for Blog {
//! #     fn get(&self, f: &str) -> Option<Value> { (f == "id").then(|| self.id.into_value()) }
//! #     fn set(&mut self, f: &str, v: Value) -> Result<(), ModelError> { self.id = extract(f, v)?; Ok(()) }
//! # }
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     RecordMeta::new("Blog", "blogs", Blog::default)
//!         .with_field(FieldInfo::new("id", FieldType::BigInteger).primary_key()),
//! );
//! let blogs = registry.companion::<Blog>().unwrap();
//! assert_eq!(blogs.table(), "blogs");
//! ```

use crate::association::AssociationError;
use crate::executor::Row;
use crate::model::{FieldInfo, ModelError, Record, ID_FIELD};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Companion of a record type: table, fields and factory
pub struct RecordMeta<T> {
    name: &'static str,
    table: &'static str,
    fields: Vec<FieldInfo>,
    factory: fn() -> T,
}

impl<T> std::fmt::Debug for RecordMeta<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMeta")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T: Record> RecordMeta<T> {
    /// Create a companion with no fields
    ///
    /// `name` is the model name the naming convention derives foreign keys from
    /// (e.g. `"BlogPost"` → `blog_post_id`).
    pub fn new(name: &'static str, table: &'static str, factory: fn() -> T) -> Self {
        Self {
            name,
            table,
            fields: Vec::new(),
            factory,
        }
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// The primary key field: the one marked as such, else the `id` field
    pub fn primary_key(&self) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.is_primary_key())
            .or_else(|| self.field(ID_FIELD))
    }

    /// Create a new blank instance
    pub fn new_instance(&self) -> T {
        (self.factory)()
    }

    /// Read every declared field of a record into a row keyed by column name
    pub fn to_row(&self, record: &T) -> Result<Row, ModelError> {
        self.fields
            .iter()
            .map(|f| f.get(record).map(|v| (f.column_name().to_string(), v)))
            .collect()
    }

    /// Write the columns present in `row` back into a record
    pub fn apply_row(&self, record: &mut T, row: &Row) -> Result<(), ModelError> {
        for field in &self.fields {
            if let Some(value) = row.get(field.column_name()) {
                field.set(record, value.clone())?;
            }
        }
        Ok(())
    }

    /// Materialize a record from a row
    pub fn from_row(&self, row: &Row) -> Result<T, ModelError> {
        let mut record = self.new_instance();
        self.apply_row(&mut record, row)?;
        Ok(record)
    }
}

/// Registry mapping record types to their companions
///
/// Populated once at startup, then shared by reference with every
/// association built from it.
#[derive(Default)]
pub struct Registry {
    companions: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("companions", &self.companions.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the companion of `T`, replacing any earlier registration
    pub fn register<T: Record>(&mut self, meta: RecordMeta<T>) -> &mut Self {
        log::debug!("Registering record type {} (table {})", meta.name(), meta.table());
        self.companions.insert(TypeId::of::<T>(), Arc::new(meta));
        self
    }

    pub fn contains<T: Record>(&self) -> bool {
        self.companions.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.companions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }

    /// Look up the companion of `T`
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::NotRegistered` if `T` was never registered.
    pub fn companion<T: Record>(&self) -> Result<Arc<RecordMeta<T>>, AssociationError> {
        let not_registered = || AssociationError::NotRegistered(std::any::type_name::<T>().to_string());
        let entry = self
            .companions
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or_else(not_registered)?;
        entry
            .downcast::<RecordMeta<T>>()
            .map_err(|_| not_registered())
    }
}
