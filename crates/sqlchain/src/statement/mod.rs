//! Statement builders.
//!
//! Each builder owns its connection handle plus one accumulator per clause it
//! supports. Compilation is a pure function of the accumulated state: every
//! `to_sql()`/`build()` call renders into a fresh [`Parameters`] store, so
//! calling it twice yields identical output.

mod delete;
mod insert;
mod raw;
mod select;
mod update;

#[cfg(test)]
mod tests;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use raw::RawQuery;
pub use select::{SelectColumn, SelectQuery};
pub use update::UpdateQuery;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::params::Parameters;
use crate::placeholder;
use std::fmt;

/// The kind of statement, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Raw => "RAW",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled statement: SQL text plus its named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Parameters,
}

impl BuiltQuery {
    /// The SQL with every placeholder replaced by its literal value.
    ///
    /// For logs and debugging only; never execute the result.
    pub fn to_raw_sql(&self) -> String {
        placeholder::replace(&self.sql, |name| {
            self.params.get(name).map(|v| v.to_sql_literal())
        })
    }
}

/// Shared surface of every statement builder.
pub trait Statement: Sized {
    fn kind(&self) -> StatementKind;

    fn connection(&self) -> &Connection;

    /// Render into `params`. Returns `""` when no table is targeted.
    fn compile_into(&self, params: &mut Parameters) -> String;

    /// Check for usage errors recorded while chaining.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Reset all accumulated state, keeping the connection.
    fn clean(self) -> Self;

    fn build(&self) -> BuiltQuery {
        let mut params = Parameters::new();
        let sql = self.compile_into(&mut params);
        BuiltQuery { sql, params }
    }

    fn to_sql(&self) -> String {
        self.build().sql
    }

    fn parameters(&self) -> Parameters {
        self.build().params
    }

    fn to_raw_sql(&self) -> String {
        self.build().to_raw_sql()
    }

    /// Validate, compile and run the statement; returns the affected row count.
    fn execute(&self) -> Result<u64> {
        let built = self.checked_build()?;
        self.connection().execute_built(self.kind(), &built)
    }

    /// [`Statement::build`] preceded by [`Statement::validate`], rejecting empty SQL.
    fn checked_build(&self) -> Result<BuiltQuery> {
        self.validate()?;
        let built = self.build();
        if built.sql.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(built)
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ensure a builder's table is only set once.
pub(crate) fn set_table(slot: &mut String, error: &mut Option<String>, table: &str) {
    if table.is_empty() {
        return;
    }
    if slot.is_empty() || slot == table {
        *slot = table.to_string();
    } else {
        error.get_or_insert_with(|| {
            format!("target table is already `{slot}`, cannot retarget to `{table}`")
        });
    }
}

pub(crate) fn check_error(error: Option<&str>) -> Result<()> {
    match error {
        Some(message) => Err(Error::invalid(message)),
        None => Ok(()),
    }
}
