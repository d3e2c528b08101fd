//! SQL dialects and identifier quoting.

use crate::ident::Column;
use serde::Deserialize;
use std::fmt;

/// The target database engine.
///
/// Only identifier quoting depends on the dialect; every statement is
/// otherwise rendered identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "pgsql", alias = "postgresql")]
    Postgres,
    #[serde(alias = "sqlite3")]
    Sqlite,
    /// Standard double-quote quoting for any other engine.
    #[default]
    Ansi,
}

impl Dialect {
    /// Map a driver name (`mysql`, `pgsql`, `sqlite`, ...) to a dialect.
    pub fn from_driver(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Dialect::MySql,
            "pgsql" | "postgres" | "postgresql" => Dialect::Postgres,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            _ => Dialect::Ansi,
        }
    }

    /// Canonical driver name.
    pub fn driver_name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "pgsql",
            Dialect::Sqlite => "sqlite",
            Dialect::Ansi => "ansi",
        }
    }

    /// The identifier quote character.
    pub fn quote_char(&self) -> char {
        match self {
            Dialect::MySql | Dialect::Sqlite => '`',
            Dialect::Postgres | Dialect::Ansi => '"',
        }
    }

    /// Wrap a whole string as a single identifier.
    pub fn quote_ident(&self, ident: &str) -> String {
        if ident.is_empty() {
            return String::new();
        }
        let q = self.quote_char();
        let mut out = String::with_capacity(ident.len() + 2);
        out.push(q);
        for c in ident.chars() {
            if c == q {
                out.push(q);
            }
            out.push(c);
        }
        out.push(q);
        out
    }

    /// Quote a possibly dotted identifier, segment by segment.
    ///
    /// `*` is never quoted and an empty string stays empty.
    pub fn quote(&self, ident: &str) -> String {
        if ident.is_empty() {
            return String::new();
        }
        ident
            .split('.')
            .map(|part| match part {
                "*" => "*".to_string(),
                _ => self.quote_ident(part),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Format a column reference: identifiers are quoted, raw SQL passes through.
    pub fn quote_column(&self, column: &Column) -> String {
        match column {
            Column::Name(name) => self.quote(name),
            Column::Raw(sql) => sql.clone(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}
