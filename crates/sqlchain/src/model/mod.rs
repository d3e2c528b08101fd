//! A small Active Record layer over the statement builders.
//!
//! Implement [`Model`] for a row type (plus [`FromRow`]) and the trait
//! supplies lookups, persistence, relations, soft deletes and timestamps:
//!
//! ```ignore
//! struct Task { id: Option<i64>, title: String, user_id: i64 }
//!
//! impl Model for Task {
//!     const TIMESTAMPS: bool = true;
//!
//!     fn attributes(&self) -> Data {
//!         Data::new()
//!             .with("id", self.id)
//!             .with("title", self.title.as_str())
//!             .with("user_id", self.user_id)
//!     }
//!
//!     fn set_id(&mut self, id: Value) {
//!         self.id = id.as_i64();
//!     }
//! }
//!
//! let open = Task::query(&conn).where_eq("done", false).get()?;
//! ```

mod query;

#[cfg(test)]
mod tests;

pub use query::{ModelQuery, Trashed};

use crate::clause::Where;
use crate::connection::Connection;
use crate::data::Data;
use crate::error::{Error, Result};
use crate::inflector::{self, EnglishInflector};
use crate::row::FromRow;
use crate::value::Value;
use chrono::Utc;

/// Column stamped when a record is created.
pub const CREATED_AT: &str = "created_at";

/// Column stamped whenever a record is written.
pub const UPDATED_AT: &str = "updated_at";

/// A named query modifier, see [`Model::scopes`].
pub type Scope<M> = fn(ModelQuery<M>) -> ModelQuery<M>;

pub(crate) fn now() -> Value {
    Value::from(Utc::now().naive_utc())
}

/// A type persisted as one row of [`Model::table`].
pub trait Model: FromRow + Sized + 'static {
    const PRIMARY_KEY: &'static str = "id";

    /// Column used by [`Model::find`]; the primary key when `None`.
    const FIND_BY: Option<&'static str> = None;

    /// Soft-delete column, conventionally `deleted_at`.
    const SOFT_DELETE: Option<&'static str> = None;

    /// Stamp `created_at`/`updated_at` on writes.
    const TIMESTAMPS: bool = false;

    /// Table name; defaults to the pluralized snake-case type name.
    fn table() -> String {
        inflector::table_name(&EnglishInflector, std::any::type_name::<Self>())
    }

    /// Column values to persist.
    fn attributes(&self) -> Data;

    /// Store the id generated by an insert.
    fn set_id(&mut self, id: Value);

    fn id(&self) -> Option<Value> {
        self.attributes()
            .get(Self::PRIMARY_KEY)
            .filter(|v| !v.is_null())
            .cloned()
    }

    /// Named scopes available through [`ModelQuery::scope`].
    fn scopes() -> Vec<(&'static str, Scope<Self>)> {
        Vec::new()
    }

    // ==================== Lookups ====================

    fn query(conn: &Connection) -> ModelQuery<Self> {
        ModelQuery::new(conn.clone())
    }

    fn all(conn: &Connection) -> Result<Vec<Self>> {
        Self::query(conn).get()
    }

    fn find(conn: &Connection, id: impl Into<Value>) -> Result<Option<Self>> {
        Self::query(conn).find(id)
    }

    fn find_or_fail(conn: &Connection, id: impl Into<Value>) -> Result<Self> {
        let id = id.into();
        Self::find(conn, id.clone())?.ok_or_else(|| {
            Error::not_found(format!(
                "no {} row with {} = {id}",
                Self::table(),
                Self::FIND_BY.unwrap_or(Self::PRIMARY_KEY)
            ))
        })
    }

    // ==================== Persistence ====================

    /// Insert a row and return the generated id.
    fn create(conn: &Connection, data: impl Into<Data>) -> Result<Option<Value>> {
        let mut data: Data = data.into();
        if Self::TIMESTAMPS {
            let now = now();
            if data.get(CREATED_AT).is_none_or(Value::is_null) {
                data.set(CREATED_AT, now.clone());
            }
            data.set(UPDATED_AT, now);
        }
        conn.table(&Self::table()).insert(data).insert_get_id()
    }

    /// Delete the row with primary key `id` (soft when configured).
    fn destroy(conn: &Connection, id: impl Into<Value>) -> Result<u64> {
        Self::query(conn).where_eq(Self::PRIMARY_KEY, id).delete()
    }

    /// Update the row when the model has an id, insert it otherwise.
    ///
    /// After an insert the generated id is stored with [`Model::set_id`].
    fn save(&mut self, conn: &Connection) -> Result<bool> {
        let mut data = self.attributes();
        data.remove(Self::PRIMARY_KEY);

        match self.id() {
            Some(id) => {
                let affected = Self::query(conn)
                    .with_trashed()
                    .where_eq(Self::PRIMARY_KEY, id)
                    .update(data)?;
                Ok(affected > 0)
            }
            None => {
                if let Some(id) = Self::create(conn, data)? {
                    self.set_id(id);
                }
                Ok(true)
            }
        }
    }

    fn delete(&self, conn: &Connection) -> Result<u64> {
        let id = self.id().ok_or_else(|| {
            Error::invalid(format!("cannot delete a {} row without a primary key", Self::table()))
        })?;
        Self::destroy(conn, id)
    }

    /// Reload from the database. Returns `false` when the row is gone.
    fn refresh(&mut self, conn: &Connection) -> Result<bool> {
        let Some(id) = self.id() else {
            return Ok(false);
        };
        match Self::query(conn)
            .with_trashed()
            .where_eq(Self::PRIMARY_KEY, id)
            .first()?
        {
            Some(fresh) => {
                *self = fresh;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ==================== Relations ====================

    /// Rows of `R` whose `foreign_key` equals this model's `local_key`.
    ///
    /// `foreign_key` defaults to `<singular table>_id`, `local_key` to the
    /// primary key.
    fn has_many<R: Model>(
        &self,
        conn: &Connection,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> ModelQuery<R> {
        let foreign_key = foreign_key
            .map(str::to_string)
            .unwrap_or_else(|| inflector::foreign_key(conn.inflector(), &Self::table()));
        let value = match local_key {
            Some(key) => self.attributes().get(key).cloned(),
            None => self.id(),
        };
        R::query(conn).where_eq(foreign_key.as_str(), value.unwrap_or(Value::Null))
    }

    fn has_one<R: Model>(
        &self,
        conn: &Connection,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Option<R>> {
        self.has_many::<R>(conn, foreign_key, local_key).first()
    }

    /// The `R` row referenced by this model's `foreign_key`
    /// (default `<singular R table>_id`).
    fn belongs_to<R: Model>(&self, conn: &Connection, foreign_key: Option<&str>) -> Result<Option<R>> {
        let foreign_key = foreign_key
            .map(str::to_string)
            .unwrap_or_else(|| inflector::foreign_key(conn.inflector(), &R::table()));
        match self.attributes().get(&foreign_key) {
            Some(value) if !value.is_null() => {
                R::query(conn).where_eq(R::PRIMARY_KEY, value).first()
            }
            _ => Ok(None),
        }
    }
}
