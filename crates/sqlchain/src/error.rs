//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for sqlchain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum Error {
    /// A builder was used in a way that cannot produce valid SQL
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A named method (scope, operator) does not exist
    #[error("Call to undefined method `{name}`.{}", suggestion_suffix(.suggestion))]
    UnknownMethod {
        name: String,
        suggestion: Option<String>,
    },

    /// Execution was requested on a connection without an executor
    #[error("No executor is attached to this connection")]
    NoConnection,

    /// Execution was requested for a statement that rendered no SQL
    #[error("Cannot execute an empty statement (no table was targeted)")]
    EmptyQuery,

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// PostgreSQL driver error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    /// Error raised by a user-supplied executor
    #[error("Executor error: {0}")]
    Executor(Box<dyn std::error::Error + Send + Sync>),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" Did you mean `{s}`?"),
        None => String::new(),
    }
}

impl Error {
    /// Create an invalid-argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap an arbitrary executor error
    pub fn executor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Executor(err.into())
    }

    /// Unknown method `name`, annotated with the closest of `candidates`.
    pub fn unknown_method<'a>(
        name: impl Into<String>,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let name = name.into();
        let suggestion = closest_match(&name, candidates).map(str::to_string);
        Self::UnknownMethod { name, suggestion }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a usage error raised before reaching the database
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnknownMethod { .. } | Self::EmptyQuery
        )
    }
}

/// Pick the candidate with the smallest edit distance to `name`.
///
/// Candidates further away than half of `name`'s length are ignored.
pub(crate) fn closest_match<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let needle = name.to_ascii_lowercase();
    let limit = needle.chars().count().div_ceil(2).max(1);

    candidates
        .into_iter()
        .map(|c| (strsim::levenshtein(&needle, &c.to_ascii_lowercase()), c))
        .filter(|(d, _)| *d <= limit)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_match() {
        let names = ["active", "inactive", "popular"];
        assert_eq!(closest_match("activ", names), Some("active"));
        assert_eq!(closest_match("POPULAR", names), Some("popular"));
        assert_eq!(closest_match("zzzzzzzz", names), None);
    }

    #[test]
    fn test_unknown_method_message() {
        let err = Error::unknown_method("whereLikee", ["whereLike", "whereIn"]);
        assert_eq!(
            err.to_string(),
            "Call to undefined method `whereLikee`. Did you mean `whereLike`?"
        );

        let err = Error::unknown_method("frobnicate", ["whereLike"]);
        assert_eq!(err.to_string(), "Call to undefined method `frobnicate`.");
    }
}
