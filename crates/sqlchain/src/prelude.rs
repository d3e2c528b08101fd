//! Convenient imports for typical `sqlchain` usage.
//!
//! Brings the chain traits into scope along with the common types:
//!
//! ```ignore
//! use sqlchain::prelude::*;
//! ```

pub use crate::{
    Aggregates, Connection, Data, Dialect, Direction, Error, FromRow, GroupBy, Having, Join, Model,
    ModelQuery, Op, OrderBy, Query, Result, Row, Scope, Statement, Value, Where, raw,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteExecutor;

#[cfg(feature = "postgres")]
pub use crate::PostgresExecutor;
