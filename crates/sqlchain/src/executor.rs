//! The prepared-statement executor seam.
//!
//! Builders never talk to a driver directly: a [`Connection`](crate::Connection)
//! hands the compiled SQL and its [`Bind`]s to an [`Executor`]. The bundled
//! implementations live in [`crate::sqlite`] and [`crate::postgres`]; any other
//! driver can be plugged in by implementing this trait.

use crate::error::Result;
use crate::params::Parameters;
use crate::row::Row;
use crate::value::{ParamType, Value};

/// One named parameter as handed to an executor.
#[derive(Debug, Clone, Copy)]
pub struct Bind<'a> {
    /// Placeholder including the leading `:`.
    pub placeholder: &'a str,
    pub value: &'a Value,
    pub ty: ParamType,
}

impl<'a> Bind<'a> {
    /// Placeholder without the leading `:`.
    pub fn name(&self) -> &'a str {
        self.placeholder.trim_start_matches(':')
    }
}

/// Binds for every parameter in `params`, in registration order.
pub fn binds(params: &Parameters) -> Vec<Bind<'_>> {
    params
        .iter()
        .map(|(placeholder, value)| Bind {
            placeholder,
            value,
            ty: value.param_type(),
        })
        .collect()
}

/// Runs SQL with named parameters.
///
/// Errors are returned as produced by the underlying driver.
pub trait Executor: Send + Sync {
    /// Driver name used to pick the quoting dialect (`mysql`, `pgsql`, `sqlite`).
    fn driver_name(&self) -> &str;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, binds: &[Bind<'_>]) -> Result<u64>;

    /// Execute a query and return all rows.
    fn fetch_all(&self, sql: &str, binds: &[Bind<'_>]) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    fn fetch_one(&self, sql: &str, binds: &[Bind<'_>]) -> Result<Option<Row>> {
        Ok(self.fetch_all(sql, binds)?.into_iter().next())
    }

    /// Id generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> Result<Option<Value>> {
        Ok(None)
    }
}
