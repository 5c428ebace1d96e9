//! Error types for docsql

use thiserror::Error;

/// Result type alias for docsql operations
pub type DocResult<T> = Result<T, DocError>;

/// Error types for document store operations
#[derive(Debug, Error)]
pub enum DocError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// PostgreSQL execution error, propagated verbatim
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Pg(#[from] tokio_postgres::Error),

    /// SQLite execution error, propagated verbatim
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Document serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error (bad field path, operator misuse)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not available on the target backend
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl DocError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unsupported-operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DocError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
