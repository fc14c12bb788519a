//! Error types for the feed domain layer.
//!
//! This module defines a small hierarchy of error types:
//!
//! - [`StorageError`] - Database/repository errors
//! - [`FeedError`] - Pagination and message mutation errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// existence probes, transactions, and row decoding.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Database constraint was violated (unique, foreign key, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Row data could not be converted into a domain model.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Feed Errors
// =============================================================================

/// Errors surfaced by pagination requests and message mutations.
///
/// Duplicate identifiers are never reported here: the client merge
/// engine resolves them silently.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// Cursor string does not decode to a valid message identifier.
    #[error("Bad cursor: {0}")]
    BadCursor(String),

    /// Pagination request or mutation input is malformed.
    ///
    /// Raised before any query is issued.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Row-store query or boundary probe failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] StorageError),

    /// The create-message mutation was rejected.
    #[error("Mutation failed: {0}")]
    MutationFailed(String),
}

impl FeedError {
    /// Whether the error stems from caller input rather than infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadCursor(_) | Self::InvalidRequest(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la conversion Storage -> Feed préserve le message
    // Permet d'utiliser ? entre le repository et le service
    #[test]
    fn test_storage_error_converts_to_fetch() {
        fn probe() -> FeedResult<()> {
            Err(StorageError::QueryError("db failed".into()))?
        }

        let err = probe().unwrap_err();
        assert!(matches!(err, FeedError::Fetch(_)));
        assert!(err.to_string().contains("db failed"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(FeedError::BadCursor("x".into()).is_client_error());
        assert!(FeedError::InvalidRequest("x".into()).is_client_error());
        assert!(!FeedError::MutationFailed("x".into()).is_client_error());
        assert!(!FeedError::Fetch(StorageError::ConnectionError("x".into())).is_client_error());
    }
}
