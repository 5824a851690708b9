//! Foreign-key naming conventions.

use crate::config::NamingConfig;
use heck::{ToLowerCamelCase, ToSnakeCase};

/// Derives the conventional foreign-key field name for a model name
pub trait NamingConvention {
    fn foreign_key(&self, model_name: &str) -> String;
}

/// `BlogPost` → `blog_post_id` (with the default suffix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeCaseNaming {
    suffix: String,
}

impl SnakeCaseNaming {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(config.foreign_key_suffix.clone())
    }
}

impl Default for SnakeCaseNaming {
    fn default() -> Self {
        Self::new("_id")
    }
}

impl NamingConvention for SnakeCaseNaming {
    fn foreign_key(&self, model_name: &str) -> String {
        format!("{}{}", model_name.to_snake_case(), self.suffix)
    }
}

/// `BlogPost` → `blogPostId`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamelCaseNaming;

impl NamingConvention for CamelCaseNaming {
    fn foreign_key(&self, model_name: &str) -> String {
        format!("{}Id", model_name.to_lower_camel_case())
    }
}
