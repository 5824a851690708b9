//! Integration tests for associations against PostgreSQL
//!
//! Note: These tests require a running PostgreSQL database. Set TEST_DATABASE_URL
//! to run them; without it they return early.

mod common;

use common::{author, blog, persist, post, tag, Author, Blog, Post, PostTag, Tag};
use lifeguard_assoc::{
    connect, Association, Associations, ConditionMap, LifeError, MayPostgresExecutor,
};

fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.is_empty() => Some(url),
        _ => {
            eprintln!("TEST_DATABASE_URL not set; skipping PostgreSQL association tests");
            None
        }
    }
}

// Helper function to set up test database schema
fn setup_test_schema(executor: &MayPostgresExecutor) -> Result<(), LifeError> {
    for table in ["post_tags", "tags", "posts", "blogs", "authors"] {
        executor.execute(&format!("DROP TABLE IF EXISTS {table}"))?;
    }
    executor.execute("CREATE TABLE authors (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL)")?;
    executor.execute(
        "CREATE TABLE blogs (id BIGSERIAL PRIMARY KEY, author_id BIGINT, title TEXT NOT NULL)",
    )?;
    executor.execute(
        "CREATE TABLE posts (
            id BIGSERIAL PRIMARY KEY,
            blog_id BIGINT,
            title TEXT NOT NULL,
            published BOOLEAN NOT NULL DEFAULT FALSE,
            payload JSONB
        )",
    )?;
    executor.execute("CREATE TABLE tags (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL)")?;
    executor.execute(
        "CREATE TABLE post_tags (id BIGSERIAL PRIMARY KEY, post_id BIGINT, tag_id BIGINT)",
    )?;
    Ok(())
}

fn with_executor(test: impl FnOnce(&MayPostgresExecutor) + Send + 'static) {
    let Some(url) = database_url() else {
        return;
    };
    let handle = may::go!(move || {
        let client = connect(&url).expect("Failed to connect to database");
        let executor = MayPostgresExecutor::new(client);
        setup_test_schema(&executor).expect("Failed to setup schema");
        test(&executor);
    });
    handle.join().expect("test coroutine panicked");
}

#[test]
fn test_belongs_to_round_trip() {
    with_executor(|executor| {
        let registry = common::registry();
        let assoc = Associations::new(&registry);

        let mut ada = author("Ada");
        persist(&registry, executor, &mut ada);
        assert!(ada.id.is_some());

        let mut engineering = blog("Engineering");
        {
            let mut writer = assoc.belongs_to::<Author, _>(&mut engineering).unwrap();
            writer.assign(&ada).unwrap();
            assert_eq!(writer.get(executor).unwrap(), Some(ada.clone()));
        }
        persist(&registry, executor, &mut engineering);

        let mut reloaded = Blog {
            id: engineering.id,
            author_id: engineering.author_id,
            title: String::new(),
        };
        let writer = assoc.belongs_to::<Author, _>(&mut reloaded).unwrap();
        assert_eq!(writer.get(executor).unwrap().map(|a| a.name), Some("Ada".to_string()));
    });
}

#[test]
fn test_has_many_round_trip() {
    with_executor(|executor| {
        let registry = common::registry();
        let assoc = Associations::new(&registry);

        let mut engineering = blog("Engineering");
        persist(&registry, executor, &mut engineering);

        let posts = assoc.has_many::<Post, _>(&engineering).unwrap();
        let mut hello = post("Hello");
        assert!(posts.associate(executor, &mut hello).unwrap());
        assert!(hello.id.is_some());

        let published = assoc
            .has_many_with::<Post, _>(&engineering, ConditionMap::new().with("published", true), None)
            .unwrap();
        let mut release = published.build().unwrap();
        release.title = "Release".to_string();
        assert!(published.associate(executor, &mut release).unwrap());

        assert_eq!(posts.all(executor).unwrap().len(), 2);
        assert_eq!(published.all(executor).unwrap(), vec![release]);
        assert_eq!(posts.relation().unwrap().count(executor).unwrap(), 2);
        assert_eq!(executor.depth(), 0);
    });
}

#[test]
fn test_has_many_through_round_trip() {
    with_executor(|executor| {
        let registry = common::registry();
        let assoc = Associations::new(&registry);

        let mut hello = post("Hello");
        persist(&registry, executor, &mut hello);
        let mut rust = tag("rust");
        let mut sql = tag("sql");
        persist(&registry, executor, &mut rust);
        persist(&registry, executor, &mut sql);

        let through = assoc.has_many::<PostTag, _>(&hello).unwrap();
        let tags = assoc
            .has_many_through::<Tag, _, _>(through, ConditionMap::new(), None, None)
            .unwrap();
        assert!(tags.associate(executor, &mut rust).unwrap());
        assert!(tags.associate(executor, &mut sql).unwrap());

        let mut names: Vec<String> = tags.all(executor).unwrap().into_iter().map(|t| t.name).collect();
        names.sort();
        assert_eq!(names, vec!["rust".to_string(), "sql".to_string()]);
    });
}
