//! Common error types for the festive catalog

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the store and the services
///
/// Only `Validation`, `Conflict` and `NotFound` are client-facing. Date
/// parsing problems never show up here; they are absorbed by the analytics.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed required input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identifier already present in the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for the three kinds a caller should surface as a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Conflict(_) | Error::NotFound(_)
        )
    }
}
