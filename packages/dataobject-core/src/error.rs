//! Data-access error types.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;

/// Data-access operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Table has no column definitions
    #[error("Must define columns before table '{table}' is set")]
    MissingColumns { table: String },

    /// Column defined twice in one table
    #[error("Column '{column}' defined more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Column definition is malformed
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// Column name not present in the table definition
    #[error("Table '{table}' definition doesn't have column named '{column}'")]
    UnknownColumn { table: String, column: String },

    /// Operation requires a primary integer `id` column
    #[error("({operation}): table '{table}' must have primary integer id column")]
    MissingIdColumn {
        table: String,
        operation: &'static str,
    },

    /// Operation requires an integer `is_active` column
    #[error("({operation}): table '{table}' must have an integer is_active column")]
    MissingActiveColumn {
        table: String,
        operation: &'static str,
    },

    /// More than one column flagged primary
    #[error("Table '{table}' declares more than one primary column ({first}, {second})")]
    MultiplePrimaryKeys {
        table: String,
        first: String,
        second: String,
    },

    /// Content table column collides with a structural column
    #[error("Content table '{table}' already has predefined column named '{column}'")]
    ReservedContentColumn { table: String, column: String },

    /// Content table column flagged unique
    #[error("Content table '{table}' forbidden to contain unique column '{column}'")]
    UniqueContentColumn { table: String, column: String },

    /// Table name empty after sanitization
    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),

    /// CREATE/ALTER TABLE failed
    #[error("Table '{table}' creation failed! {message}")]
    TableCreationFailed {
        table: String,
        code: Option<i64>,
        message: String,
    },

    /// Prepare/execute failure reported by the engine
    #[error("Statement error{}: {message}", .code.map(|c| format!(" [{c}]")).unwrap_or_default())]
    Statement { code: Option<i64>, message: String },

    /// Content row write failed mid-operation
    #[error("Failed to write '{language}' content on table '{table}': {message}")]
    ContentWriteFailed {
        table: String,
        language: String,
        code: Option<i64>,
        message: String,
    },

    /// No free value left below a numeric unique column's minimum
    #[error("Table '{table}' has no free value left below the minimum of unique column '{column}'")]
    UniqueValueExhausted { table: String, column: String },

    /// Caller supplied unusable input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Driver name has no dialect
    #[error("Driver '{0}' not supported")]
    UnsupportedDriver(String),

    /// Configuration value could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lock poisoned (Mutex poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}

impl DataError {
    /// Creates a statement error from an engine code and message.
    pub fn statement(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Statement {
            code,
            message: message.into(),
        }
    }

    /// Returns the underlying engine's numeric error code, if any.
    pub fn engine_code(&self) -> Option<i64> {
        match self {
            Self::TableCreationFailed { code, .. }
            | Self::Statement { code, .. }
            | Self::ContentWriteFailed { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns true for schema-definition errors raised at setup time.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumns { .. }
                | Self::DuplicateColumn { .. }
                | Self::InvalidColumn { .. }
                | Self::UnknownColumn { .. }
                | Self::MissingIdColumn { .. }
                | Self::MissingActiveColumn { .. }
                | Self::MultiplePrimaryKeys { .. }
                | Self::ReservedContentColumn { .. }
                | Self::UniqueContentColumn { .. }
                | Self::InvalidTableName(_)
        )
    }

    /// Splits an error into engine code and message for re-wrapping.
    pub(crate) fn into_code_and_message(self) -> (Option<i64>, String) {
        match self {
            Self::Statement { code, message } => (code, message),
            other => (other.engine_code(), other.to_string()),
        }
    }
}
