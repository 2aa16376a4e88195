//! Error types for the folio domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CursorError`] - Opaque cursor decoding failures
//! - [`ArgumentError`] - Invalid pagination arguments supplied by a caller
//! - [`StoreError`] - Store collaborator failures
//! - [`PathError`] - Unparseable URI input
//! - [`PaginationError`] / [`ResolveError`] - Top-level service errors
//!
//! "Nothing found" is never an error: services return empty pages or
//! `None` for it. Error conversion is automatic via `From`
//! implementations, allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Cursor Errors
// =============================================================================

/// A cursor string could not be decoded into a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The cursor is not valid base64.
    #[error("Cursor is not valid base64")]
    InvalidEncoding,

    /// The decoded bytes are not UTF-8.
    #[error("Cursor is not valid UTF-8")]
    InvalidUtf8,

    /// The decoded text is not of the form `tag:key`.
    #[error("Malformed cursor: {0}")]
    Malformed(String),

    /// The cursor belongs to another connection.
    #[error("Cursor belongs to connection '{found}', expected '{expected}'")]
    TagMismatch {
        /// Tag of the connection being paginated.
        expected: String,
        /// Tag carried by the cursor.
        found: String,
    },
}

// =============================================================================
// Argument Errors
// =============================================================================

/// Pagination arguments rejected before any store access.
///
/// These are always reported to the caller, never silently corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Both `first` and `last` were supplied.
    #[error("Arguments 'first' and 'last' cannot be used together")]
    FirstAndLast,

    /// `first` or `last` was negative.
    #[error("Argument '{argument}' must be a non-negative integer, got {value}")]
    NegativeCount {
        /// Argument name (`first` or `last`).
        argument: &'static str,
        /// Supplied value.
        value: i64,
    },

    /// `after` or `before` could not be decoded for this connection.
    #[error("Invalid cursor for argument '{argument}': {source}")]
    InvalidCursor {
        /// Argument name (`after` or `before`).
        argument: &'static str,
        /// Decoding failure.
        #[source]
        source: CursorError,
    },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Store collaborator errors.
///
/// Surfaced as-is; retry policy belongs to the store, not the core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to establish a database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Stored data could not be converted into a domain value.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),
}

// =============================================================================
// Path Errors
// =============================================================================

/// A URI that cannot be parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The input was empty or whitespace.
    #[error("URI cannot be empty")]
    Empty,

    /// The input could not be parsed as an absolute or relative URL.
    #[error("Malformed URI '{uri}': {reason}")]
    Malformed {
        /// The raw input.
        uri: String,
        /// Parser message.
        reason: String,
    },
}

// =============================================================================
// Service Errors
// =============================================================================

/// Errors returned by [`crate::services::ConnectionResolver::paginate`].
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Invalid pagination arguments.
    #[error("Argument error: {0}")]
    Argument(#[from] ArgumentError),

    /// Store fetch failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors returned by [`crate::services::NodeResolver`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The URI could not be parsed.
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// Store lookup failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pagination.
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Result type for URI resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la chaîne de conversion d'erreurs fonctionne
    #[test]
    fn test_error_conversion_chain() {
        let store_err = StoreError::QueryError("db failed".into());
        let pagination_err: PaginationError = store_err.into();
        assert!(pagination_err.to_string().contains("db failed"));

        let arg_err: PaginationError = ArgumentError::FirstAndLast.into();
        assert!(matches!(arg_err, PaginationError::Argument(ArgumentError::FirstAndLast)));

        let path_err: ResolveError = PathError::Empty.into();
        assert!(path_err.to_string().contains("empty"));
    }

    // Le message d'un curseur invalide nomme l'argument fautif
    #[test]
    fn test_invalid_cursor_names_argument() {
        let err = ArgumentError::InvalidCursor {
            argument: "after",
            source: CursorError::TagMismatch {
                expected: "comment".into(),
                found: "userrole".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("after") && msg.contains("userrole"));
    }
}
