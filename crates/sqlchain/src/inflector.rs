//! Word inflection for naming conventions.
//!
//! Used to derive default join keys (`tasks` → `task_id`) and model table
//! names (`BlogPost` → `blog_posts`).

use heck::ToSnakeCase;

/// Singular/plural conversion of English words.
pub trait Inflector: Send + Sync {
    fn singularize(&self, word: &str) -> String;
    fn pluralize(&self, word: &str) -> String;
}

/// Default inflector backed by the `pluralizer` rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }
        pluralizer::pluralize(word, 1, false)
    }

    fn pluralize(&self, word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }
        pluralizer::pluralize(word, 2, false)
    }
}

/// Conventional foreign key column for `table`: `users` → `user_id`.
pub fn foreign_key(inflector: &dyn Inflector, table: &str) -> String {
    let base = table.rsplit('.').next().unwrap_or(table);
    format!("{}_id", inflector.singularize(base))
}

/// Conventional table name for a Rust type name: `BlogPost` → `blog_posts`.
pub fn table_name(inflector: &dyn Inflector, type_name: &str) -> String {
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    inflector.pluralize(&short.to_snake_case())
}
