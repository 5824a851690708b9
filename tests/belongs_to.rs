//! Integration tests for belongs-to associations
//!
//! Blog belongs_to Author through `blogs.author_id`, run against the
//! in-memory executor.

mod common;

use common::{author, blog, persist, Author, Blog};
use lifeguard_assoc::{Association, AssociationError, Associations, MemoryExecutor};
use pretty_assertions::assert_eq;

#[test]
fn test_get_resolves_owner_foreign_key() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);

    let mut ada = author("Ada");
    let mut grace = author("Grace");
    persist(&registry, &exec, &mut ada);
    persist(&registry, &exec, &mut grace);

    let mut engineering = blog("Engineering");
    engineering.author_id = grace.id;

    let writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
    assert_eq!(writer.get(&exec).unwrap(), Some(grace));
}

#[test]
fn test_get_with_null_foreign_key_is_none() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    persist(&registry, &exec, &mut author("Ada"));

    let mut orphan = blog("Orphan");
    let writer = assoc.belongs_to::<Author, _>(&mut orphan).unwrap();

    assert_eq!(
        writer.relation().unwrap().to_sql(),
        r#"SELECT "authors"."id", "authors"."name" FROM "authors" WHERE "authors"."id" IS NULL LIMIT 1"#
    );
    assert_eq!(writer.get(&exec).unwrap(), None);
}

#[test]
fn test_get_with_dangling_foreign_key_is_none() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);

    let mut engineering = Blog {
        author_id: Some(404),
        ..blog("Engineering")
    };
    let writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
    assert_eq!(writer.get(&exec).unwrap(), None);
}

#[test]
fn test_relation_sql() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);

    let mut engineering = Blog {
        author_id: Some(7),
        ..blog("Engineering")
    };
    let writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
    assert_eq!(
        writer.relation().unwrap().to_sql(),
        r#"SELECT "authors"."id", "authors"."name" FROM "authors" WHERE "authors"."id" = 7 LIMIT 1"#
    );
}

#[test]
fn test_assign_sets_foreign_key_in_memory_only() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);

    let mut ada = author("Ada");
    persist(&registry, &exec, &mut ada);
    let mut engineering = blog("Engineering");
    persist(&registry, &exec, &mut engineering);

    {
        let mut writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
        let assigned = writer.assign(&ada).unwrap();
        assert_eq!(assigned, &ada);
        assert_eq!(writer.get(&exec).unwrap(), Some(ada.clone()));
    }
    assert_eq!(engineering.author_id, ada.id);

    // Nothing was saved
    let stored = exec.rows("blogs");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("author_id"), Some(&sea_query::Value::BigInt(None)));
}

#[test]
fn test_assign_unsaved_target_clears_foreign_key() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);

    let mut engineering = Blog {
        author_id: Some(3),
        ..blog("Engineering")
    };
    assoc
        .belongs_to::<Author, _>(&mut engineering)
        .unwrap()
        .assign(&author("Unsaved"))
        .unwrap();
    assert_eq!(engineering.author_id, None);
}

#[test]
fn test_unknown_foreign_key_is_field_not_found() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);

    let mut engineering = blog("Engineering");
    let writer = assoc.belongs_to_with_key::<Author, _>(&mut engineering, "writer_id");

    match writer.get(&exec) {
        Err(AssociationError::FieldNotFound { record, field }) => {
            assert_eq!(record, "Blog");
            assert_eq!(field, "writer_id");
        }
        other => panic!("expected FieldNotFound, got {other:?}"),
    }
}

#[test]
fn test_companion_is_memoized_per_instance() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);

    let mut engineering = blog("Engineering");
    let writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
    let first = writer.base().companion().unwrap();
    let second = writer.base().companion().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.table(), "authors");
}

#[test]
fn test_get_sees_target_once_persisted() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);

    let mut engineering = Blog {
        author_id: Some(1),
        ..blog("Engineering")
    };
    let writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
    assert_eq!(writer.get(&exec).unwrap(), None);

    let mut ada = author("Ada");
    persist(&registry, &exec, &mut ada);
    assert_eq!(ada.id, Some(1));
    assert_eq!(writer.get(&exec).unwrap(), Some(ada));
}

#[test]
fn test_assign_is_idempotent() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let ada = Author {
        id: Some(4),
        ..author("Ada")
    };

    let mut engineering = blog("Engineering");
    {
        let mut writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
        writer.assign(&ada).unwrap();
        writer.assign(&ada).unwrap();
    }
    assert_eq!(engineering.author_id, Some(4));
}
