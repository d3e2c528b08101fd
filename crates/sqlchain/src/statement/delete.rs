//! DELETE statement builder.

use super::{Statement, StatementKind, check_error, normalize_whitespace, set_table};
use crate::clause::{Fragment, Join, JoinClause, Where, WhereClause};
use crate::condition::RenderContext;
use crate::connection::Connection;
use crate::error::Result;
use crate::params::Parameters;

/// DELETE query builder.
///
/// With joins the target is repeated (`DELETE t FROM t JOIN ...`), the form
/// multi-table deletes require.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    conn: Connection,
    table: String,
    joins: JoinClause,
    wheres: WhereClause,
    build_error: Option<String>,
}

impl DeleteQuery {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            table: String::new(),
            joins: JoinClause::default(),
            wheres: WhereClause::default(),
            build_error: None,
        }
    }

    /// Set the target table. The target can only be set once.
    pub fn from(mut self, table: &str) -> Self {
        set_table(&mut self.table, &mut self.build_error, table);
        self
    }

    pub fn target(&self) -> &str {
        &self.table
    }

    pub(crate) fn with_where(mut self, wheres: WhereClause) -> Self {
        self.wheres = wheres;
        self
    }

    pub(crate) fn with_joins(mut self, joins: JoinClause) -> Self {
        self.joins = joins;
        self
    }
}

impl Statement for DeleteQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn compile_into(&self, params: &mut Parameters) -> String {
        if self.table.is_empty() {
            return String::new();
        }
        let mut cx = RenderContext {
            dialect: self.conn.dialect(),
            inflector: self.conn.inflector(),
            table: &self.table,
            params,
        };

        let table = cx.dialect.quote(&self.table);
        let joins = self.joins.render(&mut cx);
        let wheres = self.wheres.render(&mut cx);
        let target = if joins.is_empty() { "" } else { table.as_str() };

        normalize_whitespace(&format!("DELETE {target} FROM {table} {joins} {wheres}"))
    }

    fn validate(&self) -> Result<()> {
        check_error(self.build_error.as_deref())?;
        check_error(self.wheres.error())?;
        check_error(self.joins.error())
    }

    fn clean(self) -> Self {
        Self::new(self.conn)
    }
}

impl Where for DeleteQuery {
    fn where_clause(&mut self) -> &mut WhereClause {
        &mut self.wheres
    }
}

impl Join for DeleteQuery {
    fn join_clause(&mut self) -> &mut JoinClause {
        &mut self.joins
    }
}
