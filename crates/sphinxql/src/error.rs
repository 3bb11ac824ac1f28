//! Error types for sphinxql

use crate::statement::StatementKind;
use thiserror::Error;

/// Result type alias for sphinxql operations
pub type QlResult<T> = Result<T, QlError>;

/// Errors raised while building, compiling, executing or shaping a statement.
///
/// Validation errors are raised at the call that detects them; nothing is sent to
/// the transport until a statement compiled cleanly.
#[derive(Debug, Error)]
pub enum QlError {
    /// Field name sanitized down to nothing
    #[error("Invalid field name: {0:?}")]
    InvalidField(String),

    /// Index name contains characters that cannot appear unquoted
    #[error("Invalid index name: {0:?}")]
    InvalidIndex(String),

    /// BETWEEN bounds are not strictly increasing
    #[error("Invalid range on '{field}': min {min} must be smaller than max {max}")]
    InvalidRange {
        field: String,
        min: String,
        max: String,
    },

    /// Operator cannot take the supplied value (e.g. `>` with a list)
    #[error("Operator '{op}' on '{field}' cannot take a list of values")]
    InvalidOperator { field: String, op: &'static str },

    /// SELECT/DELETE without any WHERE or MATCH condition
    #[error("{kind} on '{index}' has no WHERE/MATCH conditions")]
    EmptyPredicates { kind: StatementKind, index: String },

    /// INSERT/REPLACE column count differs from a values tuple
    #[error("Arity mismatch: {columns} columns ({column_list}) but {values} values")]
    ArityMismatch {
        columns: usize,
        column_list: String,
        values: usize,
    },

    /// A required value list was empty
    #[error("Empty values: {0}")]
    EmptyValues(String),

    /// No index was configured
    #[error("Index is empty")]
    EmptyIndex,

    /// No fields/columns were configured
    #[error("Fields are empty for {0}")]
    EmptyFields(StatementKind),

    /// `compile()` called before `select_from`/`insert_into`/`replace_into`/`delete_from`
    #[error("No statement configured: call select_from, insert_into, replace_into or delete_from first")]
    NoStatement,

    /// The transport reported a failure for a compiled statement
    #[error("{message}. Full query: [{sql}]")]
    Transport { message: String, sql: String },

    /// A declared column was absent from a returned row
    #[error("Column '{column}' missing from result row")]
    MissingColumn { column: String },

    /// Row to struct mapping failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl QlError {
    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField(field.into())
    }

    /// Create an empty values error
    pub fn empty_values(message: impl Into<String>) -> Self {
        Self::EmptyValues(message.into())
    }

    /// Wrap a transport failure together with the statement that triggered it
    pub fn transport(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// Check if this error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this error was raised by builder validation (nothing was sent)
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::Transport { .. } | Self::MissingColumn { .. } | Self::Decode(_) | Self::Config(_)
        )
    }

    /// The statement text attached to a transport failure, if any
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Transport { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for QlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
