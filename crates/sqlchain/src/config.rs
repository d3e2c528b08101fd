//! Connection configuration loaded from TOML.
//!
//! ```toml
//! default = "main"
//!
//! [connections.main]
//! driver = "sqlite"
//! database = "${APP_DATA}/app.db"
//! commands = ["PRAGMA foreign_keys = ON"]
//!
//! [connections.reporting]
//! driver = "pgsql"
//! url = "host=localhost user=report dbname=warehouse"
//! timezone = "UTC"
//!
//! [logging]
//! level = "debug"
//! max_sql_length = 200
//! ```

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::logging::SqlLogger;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Top-level configuration: named connections plus logging.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Name of the connection used when none is requested.
    #[serde(default = "default_connection_name")]
    pub default: String,

    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings of one named connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Dialect,
    /// SQLite file path or `:memory:`.
    pub database: Option<String>,
    /// libpq-style connection string or URL for server databases.
    pub url: Option<String>,
    /// Session time zone; `utc` is sent as `+00:00`.
    pub timezone: Option<String>,
    /// Statements run right after connecting.
    #[serde(default)]
    pub commands: Vec<String>,
}

/// SQL logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: Option<usize>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_connection_name() -> String {
    "default".to_string()
}

fn default_level() -> String {
    "debug".to_string()
}

fn default_max_sql_length() -> Option<usize> {
    Some(200)
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            max_sql_length: default_max_sql_length(),
            enabled: true,
        }
    }
}

impl LoggingConfig {
    pub fn to_logger(&self) -> Result<SqlLogger> {
        let level = tracing::Level::from_str(&self.level)
            .map_err(|_| Error::config(format!("unknown log level: {}", self.level)))?;
        Ok(SqlLogger {
            level,
            max_sql_length: self.max_sql_length,
            enabled: self.enabled,
        })
    }
}

impl DatabaseConfig {
    /// Read, expand and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Parse, expand and validate a config document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: DatabaseConfig = toml::from_str(raw)?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a connection by name, falling back to the default one.
    pub fn connection(&self, name: Option<&str>) -> Result<(&str, &ConnectionConfig)> {
        let name = name.unwrap_or(&self.default);
        self.connections
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| Error::config(format!("Unknown connection name `{name}`")))
    }

    fn expand_env(&mut self) -> Result<()> {
        for conn in self.connections.values_mut() {
            if let Some(db) = conn.database.as_mut() {
                *db = expand_env_vars(db)?;
            }
            if let Some(url) = conn.url.as_mut() {
                *url = expand_env_vars(url)?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.connections.is_empty() {
            return Err(Error::config("at least one [connections.<name>] entry is required"));
        }
        if !self.connections.contains_key(&self.default) {
            return Err(Error::config(format!(
                "default connection `{}` is not defined",
                self.default
            )));
        }

        for (name, conn) in &self.connections {
            match conn.driver {
                Dialect::Sqlite if is_blank(&conn.database) => {
                    return Err(Error::config(format!(
                        "connections.{name}.database must not be empty"
                    )));
                }
                Dialect::Postgres | Dialect::MySql if is_blank(&conn.url) => {
                    return Err(Error::config(format!(
                        "connections.{name}.url must not be empty"
                    )));
                }
                _ => {}
            }
        }

        self.logging.to_logger().map(|_| ())
    }
}

impl ConnectionConfig {
    /// Session time zone as an offset or zone name (`utc` → `+00:00`).
    pub fn timezone_offset(&self) -> Option<String> {
        let tz = self.timezone.as_deref()?.trim();
        if tz.is_empty() {
            return None;
        }
        if tz.eq_ignore_ascii_case("utc") {
            return Some("+00:00".to_string());
        }
        Some(tz.to_string())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn expand_env_vars(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(Error::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(Error::config("invalid env var reference: ${}"));
            }

            let v = std::env::var(&key).map_err(|_| {
                Error::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
