//! Blocking PostgreSQL executor built on the `postgres` client.
//!
//! Named `:placeholders` are rewritten to `$n` before preparing; a name used
//! twice reuses its index.

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::executor::{Bind, Executor};
use crate::placeholder;
use crate::row::Row;
use crate::value::{DATETIME_FORMAT, Value};
use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, NoTls};
use std::sync::{Mutex, MutexGuard};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN].contains(ty)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) => {
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*i as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*i as f64).to_sql(ty, out)
                } else if *ty == Type::BOOL {
                    (*i != 0).to_sql(ty, out)
                } else if is_text(ty) {
                    i.to_string().to_sql(ty, out)
                } else {
                    i.to_sql(ty, out)
                }
            }
            Value::Float(f) => {
                if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else if is_text(ty) {
                    f.to_string().to_sql(ty, out)
                } else {
                    f.to_sql(ty, out)
                }
            }
            Value::Text(s) => {
                if *ty == Type::TIMESTAMP {
                    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)?.to_sql(ty, out)
                } else if *ty == Type::TIMESTAMPTZ {
                    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)?
                        .and_utc()
                        .to_sql(ty, out)
                } else if *ty == Type::DATE {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")?.to_sql(ty, out)
                } else if *ty == Type::UUID {
                    uuid::Uuid::parse_str(s)?.to_sql(ty, out)
                } else if *ty == Type::JSON || *ty == Type::JSONB {
                    serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out)
                } else if [Type::INT2, Type::INT4, Type::INT8].contains(ty) {
                    Value::Int(s.trim().parse()?).to_sql(ty, out)
                } else if *ty == Type::FLOAT4 || *ty == Type::FLOAT8 {
                    Value::Float(s.trim().parse()?).to_sql(ty, out)
                } else {
                    s.as_str().to_sql(ty, out)
                }
            }
            Value::Blob(b) => b.as_slice().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Rewrite `:name` tokens to `$n` and order the values to match.
fn positional<'a>(sql: &str, binds: &[Bind<'a>]) -> Result<(String, Vec<&'a Value>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut values: Vec<&'a Value> = Vec::new();
    let mut missing: Option<String> = None;

    let rewritten = placeholder::replace(sql, |token| {
        if let Some(pos) = order.iter().position(|t| *t == token) {
            return Some(format!("${}", pos + 1));
        }
        match binds.iter().find(|b| b.placeholder == token) {
            Some(bind) => {
                order.push(bind.placeholder);
                values.push(bind.value);
                Some(format!("${}", order.len()))
            }
            None => {
                missing.get_or_insert_with(|| token.to_string());
                None
            }
        }
    });

    if let Some(name) = missing {
        return Err(Error::invalid(format!("placeholder {name} has no bound value")));
    }
    Ok((rewritten, values))
}

fn get<'a, T: FromSql<'a>>(row: &'a postgres::Row, idx: usize) -> Result<Option<T>> {
    Ok(row.try_get::<_, Option<T>>(idx)?)
}

fn convert_row(row: &postgres::Row) -> Result<Row> {
    let mut columns = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            get::<bool>(row, idx)?.map(Value::Bool)
        } else if *ty == Type::INT2 {
            get::<i16>(row, idx)?.map(Value::from)
        } else if *ty == Type::INT4 {
            get::<i32>(row, idx)?.map(Value::from)
        } else if *ty == Type::INT8 {
            get::<i64>(row, idx)?.map(Value::Int)
        } else if *ty == Type::FLOAT4 {
            get::<f32>(row, idx)?.map(Value::from)
        } else if *ty == Type::FLOAT8 {
            get::<f64>(row, idx)?.map(Value::Float)
        } else if *ty == Type::BYTEA {
            get::<Vec<u8>>(row, idx)?.map(Value::Blob)
        } else if *ty == Type::TIMESTAMP {
            get::<NaiveDateTime>(row, idx)?.map(Value::from)
        } else if *ty == Type::TIMESTAMPTZ {
            get::<chrono::DateTime<chrono::Utc>>(row, idx)?.map(Value::from)
        } else if *ty == Type::DATE {
            get::<NaiveDate>(row, idx)?.map(Value::from)
        } else if *ty == Type::UUID {
            get::<uuid::Uuid>(row, idx)?.map(Value::from)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            get::<serde_json::Value>(row, idx)?.map(Value::from)
        } else {
            get::<String>(row, idx)
                .map_err(|_| {
                    Error::decode(column.name(), format!("unsupported column type {ty}"))
                })?
                .map(Value::Text)
        };
        columns.push((column.name().to_string(), value.unwrap_or(Value::Null)));
    }
    Ok(Row::new(columns))
}

/// A single PostgreSQL client, serialized behind a mutex.
pub struct PostgresExecutor {
    client: Mutex<Client>,
}

impl PostgresExecutor {
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Connect using `settings.url`, then apply the session time zone.
    pub fn open(settings: &ConnectionConfig) -> Result<Self> {
        let url = settings
            .url
            .as_deref()
            .ok_or_else(|| Error::config("postgres connections need a url"))?;
        let mut client = Client::connect(url, NoTls)?;

        if let Some(tz) = settings.timezone_offset() {
            let tz = tz.replace('\'', "''");
            let sql = if tz.starts_with(['+', '-']) {
                format!("SET TIME ZONE INTERVAL '{tz}' HOUR TO MINUTE")
            } else {
                format!("SET TIME ZONE '{tz}'")
            };
            client.batch_execute(&sql)?;
        }
        Ok(Self::new(client))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Client>> {
        self.client
            .lock()
            .map_err(|_| Error::executor("postgres client mutex poisoned"))
    }
}

fn as_params<'a>(values: &'a [&'a Value]) -> Vec<&'a (dyn ToSql + Sync)> {
    values.iter().map(|v| *v as &(dyn ToSql + Sync)).collect()
}

impl Executor for PostgresExecutor {
    fn driver_name(&self) -> &str {
        "pgsql"
    }

    fn execute(&self, sql: &str, binds: &[Bind<'_>]) -> Result<u64> {
        let (sql, values) = positional(sql, binds)?;
        let mut client = self.lock()?;
        Ok(client.execute(sql.as_str(), &as_params(&values))?)
    }

    fn fetch_all(&self, sql: &str, binds: &[Bind<'_>]) -> Result<Vec<Row>> {
        let (sql, values) = positional(sql, binds)?;
        let mut client = self.lock()?;
        client
            .query(sql.as_str(), &as_params(&values))?
            .iter()
            .map(convert_row)
            .collect()
    }

    fn last_insert_id(&self) -> Result<Option<Value>> {
        let mut client = self.lock()?;
        let row = client.query_one("SELECT lastval()", &[])?;
        Ok(Some(Value::Int(row.try_get(0)?)))
    }
}
