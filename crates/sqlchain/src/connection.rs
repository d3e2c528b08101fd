//! Database handle shared by every builder.

use crate::config::{ConnectionConfig, DatabaseConfig};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::executor::{self, Executor};
use crate::inflector::{EnglishInflector, Inflector};
use crate::logging::SqlLogger;
use crate::query::Query;
use crate::row::Row;
use crate::statement::{BuiltQuery, StatementKind};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A cheap-to-clone handle: executor, dialect, inflector and SQL logger.
///
/// An offline connection ([`Connection::offline`]) compiles SQL but refuses to
/// execute it.
#[derive(Clone)]
pub struct Connection {
    executor: Option<Arc<dyn Executor>>,
    dialect: Dialect,
    inflector: Arc<dyn Inflector>,
    logger: SqlLogger,
}

impl Connection {
    /// Wrap an executor; the dialect follows its driver name.
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    pub fn from_arc(executor: Arc<dyn Executor>) -> Self {
        let dialect = Dialect::from_driver(executor.driver_name());
        Self {
            executor: Some(executor),
            dialect,
            inflector: Arc::new(EnglishInflector),
            logger: SqlLogger::default(),
        }
    }

    /// A connection that only builds SQL for `dialect`.
    pub fn offline(dialect: Dialect) -> Self {
        Self {
            executor: None,
            dialect,
            inflector: Arc::new(EnglishInflector),
            logger: SqlLogger::default(),
        }
    }

    /// Open the connection named `name` (or the default one) from `config`.
    pub fn open(config: &DatabaseConfig, name: Option<&str>) -> Result<Self> {
        let (_, settings) = config.connection(name)?;
        Ok(Self::connect(settings)?.with_logger(config.logging.to_logger()?))
    }

    /// Open a single connection from its settings.
    pub fn connect(settings: &ConnectionConfig) -> Result<Self> {
        let conn = match settings.driver {
            #[cfg(feature = "sqlite")]
            Dialect::Sqlite => Self::new(crate::sqlite::SqliteExecutor::open(settings)?),
            #[cfg(feature = "postgres")]
            Dialect::Postgres => Self::new(crate::postgres::PostgresExecutor::open(settings)?),
            other => {
                return Err(Error::config(format!(
                    "no bundled executor for driver `{other}`; wrap your own with Connection::new"
                )));
            }
        };

        for command in &settings.commands {
            conn.executor()?.execute(command, &[])?;
        }
        tracing::info!(
            target: "sqlchain",
            driver = %settings.driver,
            commands = settings.commands.len(),
            "connection opened"
        );
        Ok(conn)
    }

    pub fn with_inflector(mut self, inflector: impl Inflector + 'static) -> Self {
        self.inflector = Arc::new(inflector);
        self
    }

    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Override the dialect picked from the driver name.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn inflector(&self) -> &dyn Inflector {
        self.inflector.as_ref()
    }

    pub fn logger(&self) -> &SqlLogger {
        &self.logger
    }

    pub fn is_offline(&self) -> bool {
        self.executor.is_none()
    }

    /// The attached executor.
    pub fn executor(&self) -> Result<&dyn Executor> {
        self.executor.as_deref().ok_or(Error::NoConnection)
    }

    /// A query facade on this connection.
    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    /// A query facade targeting `table`.
    pub fn table(&self, table: &str) -> Query {
        Query::new(self.clone()).table(table)
    }

    pub fn last_insert_id(&self) -> Result<Option<Value>> {
        self.executor()?.last_insert_id()
    }

    pub(crate) fn execute_built(&self, kind: StatementKind, built: &BuiltQuery) -> Result<u64> {
        let executor = self.executor()?;
        self.logger.statement(kind, &built.sql, built.params.len());
        executor
            .execute(&built.sql, &executor::binds(&built.params))
            .inspect_err(|e| self.logger.failure(kind, &built.sql, e))
    }

    pub(crate) fn fetch_all_built(&self, kind: StatementKind, built: &BuiltQuery) -> Result<Vec<Row>> {
        let executor = self.executor()?;
        self.logger.statement(kind, &built.sql, built.params.len());
        executor
            .fetch_all(&built.sql, &executor::binds(&built.params))
            .inspect_err(|e| self.logger.failure(kind, &built.sql, e))
    }

    pub(crate) fn fetch_one_built(
        &self,
        kind: StatementKind,
        built: &BuiltQuery,
    ) -> Result<Option<Row>> {
        let executor = self.executor()?;
        self.logger.statement(kind, &built.sql, built.params.len());
        executor
            .fetch_one(&built.sql, &executor::binds(&built.params))
            .inspect_err(|e| self.logger.failure(kind, &built.sql, e))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect)
            .field(
                "driver",
                &self.executor.as_ref().map(|e| e.driver_name().to_string()),
            )
            .finish_non_exhaustive()
    }
}
