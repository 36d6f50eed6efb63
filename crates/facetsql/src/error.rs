//! Error types for facetsql

use std::time::Duration;
use thiserror::Error;

/// Result type alias for facetsql operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A statement could not be built (e.g. UPDATE without SET)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement deadline exceeded
    #[error("Statement timeout after {0:?}")]
    Timeout(Duration),

    /// The unit of work failed and rolling it back failed too
    #[error("{error} (rollback failed: {rollback})")]
    Rollback {
        error: Box<StoreError>,
        rollback: Box<StoreError>,
    },

    /// An error tagged with the operation that produced it
    #[error("{op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Combine a failed unit of work with the error its rollback produced.
    pub fn rollback(error: StoreError, rollback: StoreError) -> Self {
        Self::Rollback {
            error: Box::new(error),
            rollback: Box::new(rollback),
        }
    }

    /// Name of the outermost operation this error was tagged with, if any.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            Self::Operation { op, .. } => Some(op),
            _ => None,
        }
    }

    /// The error with all operation tags peeled off.
    pub fn root(&self) -> &StoreError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self.root(), Self::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self.root(), Self::ForeignKeyViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout(_))
    }

    /// Parse a tokio_postgres error into a more specific StoreError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

/// Tag errors with the name of the operation that produced them.
///
/// ```ignore
/// const OP: &str = "product.delete_many_by_id";
/// let affected = sql.execute(conn).await.op(OP)?;
/// ```
pub trait ResultExt<T> {
    fn op(self, op: &'static str) -> StoreResult<T>;
}

impl<T> ResultExt<T> for StoreResult<T> {
    fn op(self, op: &'static str) -> StoreResult<T> {
        self.map_err(|source| StoreError::Operation {
            op,
            source: Box::new(source),
        })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
