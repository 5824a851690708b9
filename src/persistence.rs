//! Persisting records through an executor.

use crate::association::AssociationError;
use crate::executor::LifeExecutor;
use crate::model::Record;
use crate::registry::RecordMeta;

/// Save `record`: insert it, or update the stored row with the same primary key
///
/// Returns `Ok(false)` without touching storage when [`Record::validate`]
/// rejects the record. On success the stored row is read back into the
/// record, so a key assigned by the store becomes visible on it.
///
/// # Errors
///
/// Field access failures and executor failures.
pub fn save<T, Ex>(executor: &Ex, meta: &RecordMeta<T>, record: &mut T) -> Result<bool, AssociationError>
where
    T: Record,
    Ex: LifeExecutor + ?Sized,
{
    if let Err(reason) = record.validate() {
        log::warn!("Not saving {}: {}", meta.name(), reason);
        return Ok(false);
    }

    let key = meta
        .primary_key()
        .ok_or_else(|| AssociationError::field_not_found(meta.name(), crate::model::ID_FIELD))?;
    let row = meta
        .to_row(record)
        .map_err(|e| AssociationError::from_model(meta.name(), e))?;

    let stored = executor.upsert(meta.table(), key, meta.fields(), &row)?;
    meta.apply_row(record, &stored)
        .map_err(|e| AssociationError::from_model(meta.name(), e))?;
    log::debug!("Saved {} into {}", meta.name(), meta.table());
    Ok(true)
}

/// Delete the stored row of `record`; returns whether a row was removed
pub fn destroy<T, Ex>(executor: &Ex, meta: &RecordMeta<T>, record: &T) -> Result<bool, AssociationError>
where
    T: Record,
    Ex: LifeExecutor + ?Sized,
{
    let key = meta
        .primary_key()
        .ok_or_else(|| AssociationError::field_not_found(meta.name(), crate::model::ID_FIELD))?;
    let value = key
        .get(record)
        .map_err(|e| AssociationError::from_model(meta.name(), e))?;
    if crate::value::field_type::is_null(&value) {
        return Ok(false);
    }
    let removed = executor.delete(meta.table(), key, &value)?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryExecutor;
    use crate::model::{extract, FieldInfo, ModelError};
    use crate::value::{FieldType, ValueType};
    use sea_query::Value;

    #[derive(Clone, Debug, Default)]
    struct Author {
        id: Option<i64>,
        name: String,
    }

    impl Record for Author {
        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.into_value()),
                "name" => Some(self.name.clone().into_value()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError> {
            match field {
                "id" => self.id = extract(field, value)?,
                "name" => self.name = extract(field, value)?,
                _ => return Err(ModelError::FieldNotFound(field.to_string())),
            }
            Ok(())
        }

        fn validate(&self) -> Result<(), String> {
            if self.name.is_empty() {
                return Err("name is required".to_string());
            }
            Ok(())
        }
    }

    fn meta() -> RecordMeta<Author> {
        RecordMeta::new("Author", "authors", Author::default)
            .with_field(FieldInfo::new("id", FieldType::BigInteger).primary_key())
            .with_field(FieldInfo::new("name", FieldType::Text))
    }

    #[test]
    fn test_save_assigns_key_then_updates() {
        let exec = MemoryExecutor::new();
        let meta = meta();
        let mut author = Author { id: None, name: "Ada".to_string() };

        assert!(save(&exec, &meta, &mut author).unwrap());
        assert_eq!(author.id, Some(1));

        author.name = "Ada L.".to_string();
        assert!(save(&exec, &meta, &mut author).unwrap());
        let rows = exec.rows("authors");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Ada L.")));
    }

    #[test]
    fn test_save_invalid_record_reports_false() {
        let exec = MemoryExecutor::new();
        let mut author = Author::default();
        assert!(!save(&exec, &meta(), &mut author).unwrap());
        assert!(exec.rows("authors").is_empty());
    }

    #[test]
    fn test_destroy() {
        let exec = MemoryExecutor::new();
        let meta = meta();
        let mut author = Author { id: None, name: "Grace".to_string() };
        save(&exec, &meta, &mut author).unwrap();

        assert!(destroy(&exec, &meta, &author).unwrap());
        assert!(!destroy(&exec, &meta, &author).unwrap());
        assert!(!destroy(&exec, &meta, &Author::default()).unwrap());
    }
}
