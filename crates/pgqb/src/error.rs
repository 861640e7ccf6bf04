//! Error types for pgqb

use thiserror::Error;

/// Result type alias for pgqb operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for building and executing queries
#[derive(Debug, Error)]
pub enum QbError {
    /// Builder misuse detected while composing a statement
    #[error("Validation error: {0}")]
    Validation(String),

    /// A number bound for an int8-class column cannot be represented exactly
    #[error("int8 value is out-of-range for JS number in column \"{column}\": {value}.")]
    Int8OutOfRange { column: String, value: String },

    /// Query execution error from tokio-postgres
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Error raised by a custom executor
    #[error("Executor error: {0}")]
    Executor(Box<dyn std::error::Error + Send + Sync>),
}

impl QbError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an int8 range error for a logical column name
    pub fn int8_out_of_range(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Int8OutOfRange {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Wrap an arbitrary executor failure
    pub fn executor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Executor(err.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an int8 range error
    pub fn is_int8_out_of_range(&self) -> bool {
        matches!(self, Self::Int8OutOfRange { .. })
    }
}
