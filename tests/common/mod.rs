//! Shared record types for the association integration tests
//!
//! Authors write blogs, blogs have posts, posts are tagged through `post_tags`.

#![allow(dead_code)]

use lifeguard_assoc::{
    extract, save, FieldInfo, FieldType, LifeExecutor, ModelError, Record, RecordMeta, Registry,
    ValueType,
};
use sea_query::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
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
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Blog {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub title: String,
}

impl Record for Blog {
    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into_value()),
            "author_id" => Some(self.author_id.into_value()),
            "title" => Some(self.title.clone().into_value()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError> {
        match field {
            "id" => self.id = extract(field, value)?,
            "author_id" => self.author_id = extract(field, value)?,
            "title" => self.title = extract(field, value)?,
            _ => return Err(ModelError::FieldNotFound(field.to_string())),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Post {
    pub id: Option<i64>,
    pub blog_id: Option<i64>,
    pub title: String,
    pub published: bool,
    pub payload: Option<serde_json::Value>,
}

impl Record for Post {
    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into_value()),
            "blog_id" => Some(self.blog_id.into_value()),
            "title" => Some(self.title.clone().into_value()),
            "published" => Some(self.published.into_value()),
            "payload" => Some(self.payload.clone().into_value()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError> {
        match field {
            "id" => self.id = extract(field, value)?,
            "blog_id" => self.blog_id = extract(field, value)?,
            "title" => self.title = extract(field, value)?,
            "published" => self.published = extract(field, value)?,
            "payload" => self.payload = extract(field, value)?,
            _ => return Err(ModelError::FieldNotFound(field.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("title is required".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
}

impl Record for Tag {
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
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostTag {
    pub id: Option<i64>,
    pub post_id: Option<i64>,
    pub tag_id: Option<i64>,
}

impl Record for PostTag {
    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into_value()),
            "post_id" => Some(self.post_id.into_value()),
            "tag_id" => Some(self.tag_id.into_value()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError> {
        match field {
            "id" => self.id = extract(field, value)?,
            "post_id" => self.post_id = extract(field, value)?,
            "tag_id" => self.tag_id = extract(field, value)?,
            _ => return Err(ModelError::FieldNotFound(field.to_string())),
        }
        Ok(())
    }
}

fn id() -> FieldInfo {
    FieldInfo::new("id", FieldType::BigInteger).primary_key()
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            RecordMeta::new("Author", "authors", Author::default)
                .with_field(id())
                .with_field(FieldInfo::new("name", FieldType::Text)),
        )
        .register(
            RecordMeta::new("Blog", "blogs", Blog::default)
                .with_field(id())
                .with_field(FieldInfo::new("author_id", FieldType::BigInteger))
                .with_field(FieldInfo::new("title", FieldType::Text)),
        )
        .register(
            RecordMeta::new("Post", "posts", Post::default)
                .with_field(id())
                .with_field(FieldInfo::new("blog_id", FieldType::BigInteger))
                .with_field(FieldInfo::new("title", FieldType::Text))
                .with_field(FieldInfo::new("published", FieldType::Boolean))
                .with_field(FieldInfo::new("payload", FieldType::Json)),
        )
        .register(
            RecordMeta::new("Tag", "tags", Tag::default)
                .with_field(id())
                .with_field(FieldInfo::new("name", FieldType::Text)),
        )
        .register(
            RecordMeta::new("PostTag", "post_tags", PostTag::default)
                .with_field(id())
                .with_field(FieldInfo::new("post_id", FieldType::BigInteger))
                .with_field(FieldInfo::new("tag_id", FieldType::BigInteger)),
        );
    registry
}

/// Save a record through its registered companion
pub fn persist<T: Record, Ex: LifeExecutor + ?Sized>(registry: &Registry, executor: &Ex, record: &mut T) {
    let meta = registry.companion::<T>().expect("record type registered");
    let saved = save(executor, &*meta, record).expect("save succeeds");
    assert!(saved, "record failed validation: {:?}", record);
}

pub fn author(name: &str) -> Author {
    Author {
        id: None,
        name: name.to_string(),
    }
}

pub fn blog(title: &str) -> Blog {
    Blog {
        id: None,
        author_id: None,
        title: title.to_string(),
    }
}

pub fn post(title: &str) -> Post {
    Post {
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn tag(name: &str) -> Tag {
    Tag {
        id: None,
        name: name.to_string(),
    }
}
