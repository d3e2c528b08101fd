//! # sqlchain
//!
//! A fluent, dialect-aware SQL query builder for MySQL, PostgreSQL and
//! SQLite, with a small Active Record layer on top.
//!
//! ## Features
//!
//! - **Chainable builders**: SELECT/INSERT/UPDATE/DELETE/raw statements built
//!   with consuming `fn(self) -> Self` calls
//! - **Named parameters**: every value is bound as `:{table}_{column}_{n}`,
//!   never spliced into the SQL
//! - **Dialect quoting**: backticks for MySQL/SQLite, double quotes for
//!   PostgreSQL
//! - **Executor seam**: plug any driver in through [`Executor`]; SQLite and
//!   PostgreSQL executors ship behind features
//! - **SQL logging**: every statement is reported through `tracing`
//! - **Models**: lookups, persistence, relations, soft deletes and scopes
//!
//! ## Query builders
//!
//! ```ignore
//! use sqlchain::prelude::*;
//!
//! let conn = Connection::new(SqliteExecutor::open_in_memory()?);
//!
//! // SELECT
//! let users = conn
//!     .table("users")
//!     .select(["id", "name"])
//!     .where_eq("status", "active")
//!     .where_group(|g| g.where_null("banned_at").or_where_op("karma", Op::Gt, 100))
//!     .order_desc("created_at")
//!     .limit(10)
//!     .get::<Row>()?;
//!
//! // INSERT
//! conn.table("users").insert([("name", "alice")]).execute()?;
//!
//! // UPDATE
//! conn.table("users")
//!     .update()
//!     .set_value("status", "inactive")
//!     .where_eq("id", 7)
//!     .execute()?;
//!
//! // DELETE
//! conn.table("users").delete().where_eq("id", 7).execute()?;
//! ```

pub mod clause;
pub mod condition;
pub mod config;
pub mod connection;
pub mod data;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod ident;
pub mod inflector;
pub mod logging;
pub mod model;
pub mod params;
pub mod prelude;
pub mod query;
pub mod row;
pub mod statement;
pub mod value;

mod placeholder;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use clause::{
    Aggregates, Direction, GroupBy, Having, HavingGroup, Join, JoinKind, OrderBy, Where,
    WhereGroup,
};
pub use condition::{Conjunction, Op};
pub use config::{ConnectionConfig, DatabaseConfig, LoggingConfig};
pub use connection::Connection;
pub use data::Data;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use executor::{Bind, Executor};
pub use ident::{Column, Raw, raw};
pub use inflector::{EnglishInflector, Inflector};
pub use logging::SqlLogger;
pub use model::{Model, ModelQuery, Scope, Trashed};
pub use params::Parameters;
pub use query::Query;
pub use row::{FromRow, FromValue, Row};
pub use statement::{
    BuiltQuery, DeleteQuery, InsertQuery, RawQuery, SelectQuery, Statement, StatementKind,
    UpdateQuery,
};
pub use value::{ParamType, Value};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteExecutor;

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresExecutor;
