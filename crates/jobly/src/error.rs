//! Error types for jobly

use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Error types for data-access operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Input rejected before any statement was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// No row with the requested identity
    #[error("No {entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Failure raised by PostgreSQL or the driver, passed through unchanged
    #[error("Storage error: {0}")]
    Storage(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),
}

impl JoblyError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error for `entity` with the given identity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
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

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a storage error carrying a unique constraint violation.
    ///
    /// The underlying error is left untouched; this only inspects its SQLSTATE.
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate() == Some(UNIQUE_VIOLATION)
    }

    /// Check if this is a storage error carrying a foreign key violation.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sqlstate() == Some(FOREIGN_KEY_VIOLATION)
    }

    /// SQLSTATE code of a storage error raised by the server, if any.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Self::Storage(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}
