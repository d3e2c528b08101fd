//! Column references and raw SQL fragments.
//!
//! Builders accept anything convertible into [`Column`]: plain strings are
//! identifiers (quoted per dialect, dotted names split), while [`Raw`] is
//! emitted verbatim.
//!
//! ```ignore
//! use sqlchain::{raw, Column};
//!
//! let name: Column = "users.name".into();
//! let expr: Column = raw("LOWER(email)").into();
//! ```

use std::fmt;

/// A literal SQL fragment that is never quoted or escaped.
///
/// The caller is responsible for its safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(pub String);

/// Shorthand for `Raw(sql.into())`.
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw(sql.into())
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column (or table) reference as handed to a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Identifier, possibly dotted (`table.column`).
    Name(String),
    /// Verbatim SQL.
    Raw(String),
}

impl Column {
    /// The unquoted text of this reference.
    pub fn as_str(&self) -> &str {
        match self {
            Column::Name(s) | Column::Raw(s) => s,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Column::Raw(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<&str> for Column {
    fn from(s: &str) -> Self {
        Column::Name(s.to_string())
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Column::Name(s)
    }
}

impl From<&String> for Column {
    fn from(s: &String) -> Self {
        Column::Name(s.clone())
    }
}

impl From<Raw> for Column {
    fn from(r: Raw) -> Self {
        Column::Raw(r.0)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
