//! Row mapping traits and utilities

use crate::error::{Error, Result};
use crate::value::{DATETIME_FORMAT, Value};
use chrono::{NaiveDate, NaiveDateTime};

/// A result row: column names and values in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Typed value of `column`.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| Error::decode(column, "column not found in row"))?;
        T::from_value(value).map_err(|message| Error::decode(column, message))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.columns.into_iter().map(|(_, v)| v).collect()
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.columns
    }
}

/// Trait for types that can be constructed from a result row.
///
/// ```ignore
/// impl FromRow for User {
///     fn from_row(row: &Row) -> Result<Self> {
///         Ok(User {
///             id: row.try_get("id")?,
///             name: row.try_get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

/// Conversion from a single column value.
///
/// Errors are plain messages; [`Row::try_get`] attaches the column name.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> std::result::Result<Self, String>;
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, got {value:?}")
}

impl FromValue for Value {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        value.as_i64().ok_or_else(|| mismatch("integer", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let i = i64::from_value(value)?;
        i32::try_from(i).map_err(|e| e.to_string())
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let i = i64::from_value(value)?;
        u64::try_from(i).map_err(|e| e.to_string())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        value.as_f64().ok_or_else(|| mismatch("number", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Text(s) if s == "t" || s == "true" => Ok(true),
            Value::Text(s) if s == "f" || s == "false" => Ok(false),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Null => Err(mismatch("text", value)),
            Value::Blob(b) => String::from_utf8(b.clone()).map_err(|e| e.to_string()),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("blob", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let text = value.as_str().ok_or_else(|| mismatch("datetime text", value))?;
        NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| e.to_string())
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let text = value.as_str().ok_or_else(|| mismatch("date text", value))?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| e.to_string())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(vec![
            ("id".into(), Value::Int(7)),
            ("name".into(), Value::Text("ann".into())),
            ("deleted_at".into(), Value::Null),
            ("created_at".into(), Value::Text("2024-03-01 10:00:00".into())),
        ])
    }

    #[test]
    fn test_try_get() {
        let r = row();
        assert_eq!(r.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(r.try_get::<String>("name").unwrap(), "ann");
        assert_eq!(r.try_get::<Option<String>>("deleted_at").unwrap(), None);
        assert!(r.try_get::<NaiveDateTime>("created_at").is_ok());
    }

    #[test]
    fn test_try_get_errors_name_column() {
        let err = row().try_get::<i64>("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'missing': column not found in row"
        );
        assert!(row().try_get::<String>("deleted_at").is_err());
    }
}
