/// sqlcrud Error Module
///
/// This module defines the error types returned by every sqlcrud operation.
/// Nothing is printed and discarded: driver failures and caller mistakes are
/// both surfaced as values the caller can branch on.
use thiserror::Error;

/// Error type for all sqlcrud operations.
///
/// This enum covers two families of failure:
/// - Driver errors raised by SQLite (open, constraint, syntax, close)
/// - Caller input rejected before any statement reaches the driver
#[derive(Error, Debug)]
pub enum SqlCrudError {
    /// Database-related errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Caller input that cannot be turned into a safe statement
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation was attempted without an open connection
    #[error("connection closed: call connect() before running statements")]
    ConnectionClosed,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing and encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SqlCrudError {
    /// Shorthand for building a [`SqlCrudError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        SqlCrudError::Validation(msg.into())
    }

    /// Returns `true` if the error was raised before reaching the driver.
    pub fn is_validation(&self) -> bool {
        matches!(self, SqlCrudError::Validation(_))
    }
}

/// Type alias for Result to use SqlCrudError as the error type.
pub type Result<T> = std::result::Result<T, SqlCrudError>;
