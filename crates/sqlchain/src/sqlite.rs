//! SQLite executor built on `rusqlite`.

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::executor::{Bind, Executor};
use crate::row::Row;
use crate::value::Value;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// A single SQLite connection, serialized behind a mutex.
pub struct SqliteExecutor {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteExecutor {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(settings: &ConnectionConfig) -> Result<Self> {
        match settings.database.as_deref() {
            None | Some(":memory:") => Self::open_in_memory(),
            Some(path) => Self::open_path(path),
        }
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(rusqlite::Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(rusqlite::Connection::open_in_memory()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::executor("sqlite connection mutex poisoned"))
    }
}

/// Bind every named parameter; a placeholder left unbound is an error.
fn bind_all(stmt: &mut rusqlite::Statement<'_>, binds: &[Bind<'_>]) -> Result<()> {
    let mut bound = vec![false; stmt.parameter_count()];
    for bind in binds {
        if let Some(idx) = stmt.parameter_index(bind.placeholder)? {
            stmt.raw_bind_parameter(idx, bind.value)?;
            bound[idx - 1] = true;
        }
    }
    if let Some(missing) = bound.iter().position(|b| !b) {
        let name = stmt
            .parameter_name(missing + 1)
            .unwrap_or("?")
            .to_string();
        return Err(Error::invalid(format!("placeholder {name} has no bound value")));
    }
    Ok(())
}

impl Executor for SqliteExecutor {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    fn execute(&self, sql: &str, binds: &[Bind<'_>]) -> Result<u64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        bind_all(&mut stmt, binds)?;
        Ok(stmt.raw_execute()? as u64)
    }

    fn fetch_all(&self, sql: &str, binds: &[Bind<'_>]) -> Result<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        bind_all(&mut stmt, binds)?;

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                columns.push((name.clone(), Value::from(row.get_ref(i)?)));
            }
            out.push(Row::new(columns));
        }
        Ok(out)
    }

    fn last_insert_id(&self) -> Result<Option<Value>> {
        Ok(Some(Value::Int(self.lock()?.last_insert_rowid())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::binds;
    use crate::params::Parameters;

    #[test]
    fn test_round_trip() {
        let exec = SqliteExecutor::open_in_memory().unwrap();
        exec.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL, data BLOB)", &[])
            .unwrap();

        let params: Parameters = [
            (":n", Value::from("ann")),
            (":s", Value::from(1.5)),
            (":d", Value::from(vec![1u8, 2, 3])),
        ]
        .into_iter()
        .collect();
        let affected = exec
            .execute(
                "INSERT INTO t (name, score, data) VALUES (:n, :s, :d)",
                &binds(&params),
            )
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(exec.last_insert_id().unwrap(), Some(Value::Int(1)));

        let rows = exec.fetch_all("SELECT * FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("ann".into())));
        assert_eq!(rows[0].get("score"), Some(&Value::Float(1.5)));
        assert_eq!(rows[0].get("data"), Some(&Value::Blob(vec![1, 2, 3])));
    }

    #[test]
    fn test_unbound_placeholder_is_an_error() {
        let exec = SqliteExecutor::open_in_memory().unwrap();
        let err = exec.fetch_all("SELECT :missing", &[]).unwrap_err();
        assert!(err.to_string().contains(":missing"));
    }
}
