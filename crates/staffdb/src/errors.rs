use std::path::PathBuf;

use thiserror::Error;

/// Failure raised while binding one entity onto an insert template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("SQL template is empty")]
    EmptyTemplate,

    #[error("SQL template mixes `?` and `$n` placeholders")]
    MixedPlaceholders,

    #[error("template expects {expected} parameters but {actual} were bound")]
    PlaceholderMismatch { expected: usize, actual: usize },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("malformed date for `{field}`: {date}")]
    MalformedDate { field: &'static str, date: String },
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("SQL {operation} execution failed: {source}")]
    Statement {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    pub(crate) fn statement(operation: &'static str, source: sqlx::Error) -> Self {
        Self::Statement { operation, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures confined to a single entity's binding.
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }
}
