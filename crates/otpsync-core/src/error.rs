//! Error types for otpsync-core

use thiserror::Error;

/// Result type alias using otpsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in otpsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The background proxy reported a failure or could not be reached
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// Malformed user input (empty field, bad icon file, non-object document)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn proxy(message: impl Into<String>) -> Self {
        Self::Proxy(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
