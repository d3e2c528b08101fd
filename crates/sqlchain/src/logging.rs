//! SQL logging via `tracing`.
//!
//! Every statement a [`Connection`](crate::Connection) runs is reported on the
//! `sqlchain.sql` target before it reaches the executor; failures are
//! reported again at `WARN`.

use crate::statement::StatementKind;
use tracing::Level;

/// Log target for executed SQL.
pub const SQL_TARGET: &str = "sqlchain.sql";

/// Settings for SQL event emission.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Set to `false` to silence statement events (failures are still logged).
    pub enabled: bool,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            enabled: true,
        }
    }
}

impl SqlLogger {
    /// Create a new logger with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Disable statement events.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Emit the statement about to run.
    pub(crate) fn statement(&self, kind: StatementKind, sql: &str, param_count: usize) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        if !self.enabled {
            return;
        }
        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: SQL_TARGET,
            kind = %kind,
            param_count,
            sql = %sql,
        );
    }

    /// Emit a failed statement.
    pub(crate) fn failure(&self, kind: StatementKind, sql: &str, error: &dyn std::fmt::Display) {
        let sql = self.truncate_sql(sql);
        tracing::warn!(target: SQL_TARGET, kind = %kind, sql = %sql, error = %error, "statement failed");
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
