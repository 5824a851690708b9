//! Integration tests for has-many-through associations
//!
//! Post has_many Tags through PostTag (`post_tags.post_id`, `post_tags.tag_id`),
//! run against the in-memory executor.

mod common;

use common::{persist, post, tag, Post, PostTag, Tag};
use lifeguard_assoc::{
    destroy, save, Association, AssociationError, Associations, ConditionMap, HasManyThrough,
    MemoryExecutor, Registry,
};
use pretty_assertions::assert_eq;

fn tags_of<'a>(assoc: &Associations<'a>, owner: &'a Post) -> HasManyThrough<'a, Post, Tag, PostTag> {
    let through = assoc.has_many::<PostTag, _>(owner).unwrap();
    assoc
        .has_many_through::<Tag, _, _>(through, ConditionMap::new(), None, None)
        .unwrap()
}

fn saved_post(registry: &Registry, exec: &MemoryExecutor, title: &str) -> Post {
    let mut record = post(title);
    persist(registry, exec, &mut record);
    record
}

fn saved_tag(registry: &Registry, exec: &MemoryExecutor, name: &str) -> Tag {
    let mut record = tag(name);
    persist(registry, exec, &mut record);
    record
}

#[test]
fn test_default_keys() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let hello = Post {
        id: Some(1),
        ..post("Hello")
    };

    let tags = tags_of(&assoc, &hello);
    assert_eq!(tags.config().foreign_key, "post_id");
    assert_eq!(tags.config().association_foreign_key, "tag_id");
    assert_eq!(tags.through().config().foreign_key, "post_id");
}

#[test]
fn test_relation_sql() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let hello = Post {
        id: Some(1),
        ..post("Hello")
    };

    let tags = tags_of(&assoc, &hello);
    assert_eq!(
        tags.relation().unwrap().to_sql(),
        r#"SELECT "tags"."id", "tags"."name" FROM "tags" INNER JOIN "post_tags" ON "tags"."id" = "post_tags"."tag_id" WHERE "post_tags"."post_id" = 1"#
    );
}

#[test]
fn test_assign_builds_intermediate() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let hello = saved_post(&registry, &exec, "Hello");
    let mut rust = saved_tag(&registry, &exec, "rust");

    let link = tags_of(&assoc, &hello).assign(&mut rust).unwrap();
    assert_eq!(
        link,
        PostTag {
            id: None,
            post_id: hello.id,
            tag_id: rust.id,
        }
    );
    assert!(exec.rows("post_tags").is_empty());
}

#[test]
fn test_associate_links_and_all_returns_targets() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let hello = saved_post(&registry, &exec, "Hello");
    let other = saved_post(&registry, &exec, "Other");
    let mut rust = saved_tag(&registry, &exec, "rust");
    let mut sql = saved_tag(&registry, &exec, "sql");
    saved_tag(&registry, &exec, "unused");

    let tags = tags_of(&assoc, &hello);
    assert!(tags.associate(&exec, &mut rust).unwrap());
    assert!(tags.associate(&exec, &mut sql).unwrap());
    assert!(tags_of(&assoc, &other).associate(&exec, &mut sql).unwrap());

    assert_eq!(tags.all(&exec).unwrap(), vec![rust.clone(), sql.clone()]);
    assert_eq!(tags_of(&assoc, &other).all(&exec).unwrap(), vec![sql]);
    assert_eq!(exec.rows("post_tags").len(), 3);
    assert_eq!(exec.depth(), 0);
}

#[test]
fn test_duplicate_links_yield_duplicate_targets() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let hello = saved_post(&registry, &exec, "Hello");
    let mut rust = saved_tag(&registry, &exec, "rust");

    let tags = tags_of(&assoc, &hello);
    tags.associate(&exec, &mut rust).unwrap();
    tags.associate(&exec, &mut rust).unwrap();

    assert_eq!(tags.all(&exec).unwrap(), vec![rust.clone(), rust]);
}

#[test]
fn test_target_conditions_filter_and_assign() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let hello = saved_post(&registry, &exec, "Hello");
    let mut rust = saved_tag(&registry, &exec, "rust");
    let mut sql = saved_tag(&registry, &exec, "sql");

    let all_tags = tags_of(&assoc, &hello);
    all_tags.associate(&exec, &mut rust).unwrap();
    all_tags.associate(&exec, &mut sql).unwrap();

    let through = assoc.has_many::<PostTag, _>(&hello).unwrap();
    let rust_only = assoc
        .has_many_through::<Tag, _, _>(through, ConditionMap::new().with("name", "rust"), None, None)
        .unwrap();
    assert_eq!(rust_only.all(&exec).unwrap(), vec![rust]);

    // assign writes the target conditions into the target, in memory
    let mut renamed = sql.clone();
    rust_only.assign(&mut renamed).unwrap();
    assert_eq!(renamed.name, "rust");
    assert_eq!(renamed.id, sql.id);
}

#[test]
fn test_unknown_association_foreign_key() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let hello = Post {
        id: Some(1),
        ..post("Hello")
    };

    let through = assoc.has_many::<PostTag, _>(&hello).unwrap();
    let labels = assoc
        .has_many_through::<Tag, _, _>(through, ConditionMap::new(), None, Some("label_id"))
        .unwrap();
    match labels.relation() {
        Err(AssociationError::FieldNotFound { record, field }) => {
            assert_eq!(record, "PostTag");
            assert_eq!(field, "label_id");
        }
        other => panic!("expected FieldNotFound, got {:?}", other.map(|r| r.to_sql())),
    }
}

#[test]
fn test_unsaved_owner_matches_no_links() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let unsaved = post("Unsaved");
    let mut rust = saved_tag(&registry, &exec, "rust");

    let tags = tags_of(&assoc, &unsaved);
    assert!(tags.associate(&exec, &mut rust).unwrap());

    let links = exec.rows("post_tags");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].get("post_id"), Some(&sea_query::Value::BigInt(None)));

    // The unowned link exists but belongs to no post
    assert!(tags.all(&exec).unwrap().is_empty());
    assert!(tags.relation().unwrap().to_sql().ends_with("WHERE FALSE"));
}

#[test]
fn test_unknown_target_condition_field() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let hello = Post {
        id: Some(1),
        ..post("Hello")
    };

    let through = assoc.has_many::<PostTag, _>(&hello).unwrap();
    let red = assoc
        .has_many_through::<Tag, _, _>(through, ConditionMap::new().with("colour", "red"), None, None)
        .unwrap();

    fn assert_colour_not_found<V: std::fmt::Debug>(result: Result<V, AssociationError>) {
        match result {
            Err(AssociationError::FieldNotFound { record, field }) => {
                assert_eq!(record, "Tag");
                assert_eq!(field, "colour");
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    assert_colour_not_found(red.relation().map(|r| r.to_sql()));
    assert_colour_not_found(red.condition());
    let mut target = Tag {
        id: Some(3),
        ..tag("rust")
    };
    assert_colour_not_found(red.assign(&mut target));
}

#[test]
fn test_removing_or_retargeting_the_link_drops_the_target() {
    let registry = common::registry();
    let exec = MemoryExecutor::new();
    let assoc = Associations::new(&registry);
    let hello = saved_post(&registry, &exec, "Hello");
    let mut rust = saved_tag(&registry, &exec, "rust");
    let mut sql = saved_tag(&registry, &exec, "sql");

    let tags = tags_of(&assoc, &hello);
    let link_meta = registry.companion::<PostTag>().unwrap();

    let mut rust_link = tags.assign(&mut rust).unwrap();
    assert!(save(&exec, &*link_meta, &mut rust_link).unwrap());
    let mut sql_link = tags.assign(&mut sql).unwrap();
    assert!(save(&exec, &*link_meta, &mut sql_link).unwrap());
    assert_eq!(tags.all(&exec).unwrap().len(), 2);

    assert!(destroy(&exec, &*link_meta, &rust_link).unwrap());
    assert_eq!(tags.all(&exec).unwrap(), vec![sql.clone()]);

    // Point the remaining link at a tag that does not exist
    sql_link.tag_id = Some(404);
    assert!(save(&exec, &*link_meta, &mut sql_link).unwrap());
    assert!(tags.all(&exec).unwrap().is_empty());
    assert_eq!(exec.rows("post_tags").len(), 1);
}

#[test]
fn test_assign_is_idempotent() {
    let registry = common::registry();
    let assoc = Associations::new(&registry);
    let hello = Post {
        id: Some(5),
        ..post("Hello")
    };
    let through = assoc.has_many::<PostTag, _>(&hello).unwrap();
    let rust_only = assoc
        .has_many_through::<Tag, _, _>(through, ConditionMap::new().with("name", "rust"), None, None)
        .unwrap();

    let mut target = Tag {
        id: Some(9),
        ..tag("other")
    };
    let first = rust_only.assign(&mut target).unwrap();
    let after_first = target.clone();
    let second = rust_only.assign(&mut target).unwrap();
    assert_eq!(first, second);
    assert_eq!(target, after_first);
}
