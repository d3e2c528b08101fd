//! INSERT statement builder.

use super::{Statement, StatementKind, check_error, normalize_whitespace, set_table};
use crate::connection::Connection;
use crate::data::Data;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::params::Parameters;
use crate::value::Value;

/// INSERT query builder (single or multi-row).
///
/// The column list comes from the first row; later rows are expected to carry
/// the same columns and are read in that column order.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    conn: Connection,
    table: String,
    rows: Vec<Data>,
    build_error: Option<String>,
}

impl InsertQuery {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            table: String::new(),
            rows: Vec::new(),
            build_error: None,
        }
    }

    /// Set the target table. The target can only be set once.
    pub fn into_table(mut self, table: &str) -> Self {
        set_table(&mut self.table, &mut self.build_error, table);
        self
    }

    pub fn target(&self) -> &str {
        &self.table
    }

    /// Append one row.
    pub fn values(mut self, row: impl Into<Data>) -> Self {
        self.rows.push(row.into());
        self
    }

    /// Append several rows.
    pub fn rows<I, D>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Data>,
    {
        self.rows.extend(rows.into_iter().map(Into::into));
        self
    }

    /// Set a single column on the last row, starting one if needed.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        if self.rows.is_empty() {
            self.rows.push(Data::new());
        }
        if let Some(row) = self.rows.last_mut() {
            row.set(column, value);
        }
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Execute and return the id generated for the (last) inserted row.
    pub fn insert_get_id(&self) -> Result<Option<Value>> {
        self.execute()?;
        self.conn.last_insert_id()
    }
}

impl Statement for InsertQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn compile_into(&self, params: &mut Parameters) -> String {
        if self.table.is_empty() {
            return String::new();
        }
        let d = self.conn.dialect();
        let table = d.quote(&self.table);

        let Some(first) = self.rows.first().filter(|r| !r.is_empty()) else {
            return match d {
                Dialect::MySql => format!("INSERT INTO {table} () VALUES ()"),
                _ => format!("INSERT INTO {table} DEFAULT VALUES"),
            };
        };

        let columns: Vec<&str> = first.columns().collect();
        let quoted: Vec<String> = columns.iter().map(|c| d.quote(c)).collect();

        let tuples: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let placeholders: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let value = row.get(c).cloned().unwrap_or(Value::Null);
                        params.bind(&self.table, c, value)
                    })
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        normalize_whitespace(&format!(
            "INSERT INTO {table} ({}) VALUES {}",
            quoted.join(", "),
            tuples.join(", ")
        ))
    }

    fn validate(&self) -> Result<()> {
        check_error(self.build_error.as_deref())?;
        if self.rows.iter().any(Data::is_empty) && self.rows.iter().any(|r| !r.is_empty()) {
            return Err(Error::invalid(
                "INSERT rows must either all carry columns or all be empty",
            ));
        }
        self.rows.iter().try_for_each(Data::validate)
    }

    fn clean(self) -> Self {
        Self::new(self.conn)
    }
}
