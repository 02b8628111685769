//! Custom error types for txn-review
//!
//! This module defines the error hierarchy for the review engine using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for txn-review operations
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Rejected input: blank exclusion reason, inverted filter bounds,
    /// disallowed status transition
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Persistence collaborator read/write failure
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),
}

impl ReviewError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a storage error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<std::io::Error> for ReviewError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ReviewError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for txn-review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReviewError::Validation("exclusion reason must not be blank".into());
        assert_eq!(
            err.to_string(),
            "Validation error: exclusion reason must not be blank"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = ReviewError::transaction_not_found("txn-1234abcd");
        assert_eq!(err.to_string(), "Transaction not found: txn-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_store_error() {
        let err = ReviewError::Store("disk full".into());
        assert!(err.is_store());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let review_err: ReviewError = io_err.into();
        assert!(matches!(review_err, ReviewError::Io(_)));
    }
}
