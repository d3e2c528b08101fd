//! UPDATE statement builder.

use super::{Statement, StatementKind, check_error, normalize_whitespace, set_table};
use crate::clause::{Fragment, Join, JoinClause, Where, WhereClause};
use crate::condition::RenderContext;
use crate::connection::Connection;
use crate::data::Data;
use crate::error::{Error, Result};
use crate::params::Parameters;
use crate::value::Value;

/// UPDATE query builder.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    conn: Connection,
    table: String,
    data: Data,
    joins: JoinClause,
    wheres: WhereClause,
    build_error: Option<String>,
}

impl UpdateQuery {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            table: String::new(),
            data: Data::new(),
            joins: JoinClause::default(),
            wheres: WhereClause::default(),
            build_error: None,
        }
    }

    /// Set the target table. The target can only be set once.
    pub fn table(mut self, table: &str) -> Self {
        set_table(&mut self.table, &mut self.build_error, table);
        self
    }

    pub fn target(&self) -> &str {
        &self.table
    }

    /// Merge `data` into the SET payload.
    pub fn set(mut self, data: impl Into<Data>) -> Self {
        let data: Data = data.into();
        for (column, value) in data.iter() {
            self.data.set(column, value.clone());
        }
        self
    }

    /// Set one column.
    pub fn set_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.set(column, value);
        self
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Replace the WHERE clause wholesale.
    pub(crate) fn with_where(mut self, wheres: WhereClause) -> Self {
        self.wheres = wheres;
        self
    }

    pub(crate) fn with_joins(mut self, joins: JoinClause) -> Self {
        self.joins = joins;
        self
    }
}

impl Statement for UpdateQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Update
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

        let joins = self.joins.render(&mut cx);
        let assignments: Vec<String> = self
            .data
            .iter()
            .map(|(column, value)| {
                let p = cx.bind(column, value.clone());
                format!("{} = {p}", cx.dialect.quote(column))
            })
            .collect();
        let wheres = self.wheres.render(&mut cx);

        normalize_whitespace(&format!(
            "UPDATE {} {joins} SET {} {wheres}",
            cx.dialect.quote(&self.table),
            assignments.join(", ")
        ))
    }

    fn validate(&self) -> Result<()> {
        check_error(self.build_error.as_deref())?;
        check_error(self.wheres.error())?;
        check_error(self.joins.error())?;
        self.data.validate()?;
        if self.data.is_empty() {
            return Err(Error::invalid("UPDATE requires at least one column to SET"));
        }
        Ok(())
    }

    fn clean(self) -> Self {
        Self::new(self.conn)
    }
}

impl Where for UpdateQuery {
    fn where_clause(&mut self) -> &mut WhereClause {
        &mut self.wheres
    }
}

impl Join for UpdateQuery {
    fn join_clause(&mut self) -> &mut JoinClause {
        &mut self.joins
    }
}
