//! Raw SQL escape hatch.

use super::{Statement, StatementKind};
use crate::connection::Connection;
use crate::error::Result;
use crate::params::Parameters;
use crate::row::FromRow;
use crate::value::Value;

/// Literal SQL plus caller-supplied named parameters.
///
/// The SQL is passed through verbatim; the caller is responsible for its
/// safety and for binding every placeholder it uses.
#[derive(Debug, Clone)]
pub struct RawQuery {
    conn: Connection,
    sql: String,
    params: Parameters,
}

impl RawQuery {
    pub fn new(conn: Connection, sql: impl Into<String>) -> Self {
        Self {
            conn,
            sql: sql.into(),
            params: Parameters::new(),
        }
    }

    /// Bind a named parameter (`:name` or `name`).
    pub fn bind(mut self, placeholder: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.add(placeholder, value);
        self
    }

    /// Bind several named parameters.
    pub fn bind_all<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in params {
            self.params.add(k, v);
        }
        self
    }

    pub fn get<T: FromRow>(&self) -> Result<Vec<T>> {
        let built = self.checked_build()?;
        let rows = self.conn.fetch_all_built(self.kind(), &built)?;
        rows.iter().map(T::from_row).collect()
    }

    pub fn first<T: FromRow>(&self) -> Result<Option<T>> {
        let built = self.checked_build()?;
        let row = self.conn.fetch_one_built(self.kind(), &built)?;
        row.as_ref().map(T::from_row).transpose()
    }
}

impl Statement for RawQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Raw
    }

    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn compile_into(&self, params: &mut Parameters) -> String {
        params.merge(&self.params);
        self.sql.clone()
    }

    fn clean(self) -> Self {
        Self::new(self.conn, String::new())
    }
}
