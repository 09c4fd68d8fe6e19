//! Error types for phonebook-server

use sqlx::error::ErrorKind;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Data-access failure, classified at the store boundary.
///
/// Handlers never turn these into HTTP errors. They log them and pick the
/// flash message for the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not reach the database (connect, IO, TLS)
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Integrity constraint rejected the statement
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other statement or decode failure
    #[error("query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::Other => Self::Query(err.to_string()),
                _ => Self::Constraint(err.to_string()),
            },
            _ => Self::Query(err.to_string()),
        }
    }
}

/// Server startup/runtime error
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_transient() {
        let err = StoreError::from(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn decode_errors_are_permanent() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn error_display() {
        let err = StoreError::Constraint("duplicate key".into());
        assert_eq!(err.to_string(), "constraint violation: duplicate key");
    }
}
