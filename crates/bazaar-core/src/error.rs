//! Error types for bazaar-core

use thiserror::Error;

/// Result type alias using bazaar-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bazaar-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store could not be reached or rejected the request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Product not found
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether reaching the store failed, as opposed to the store answering
    /// with something unusable or rejecting the request.
    ///
    /// Transport errors are surfaced as catalog status and retried only by an
    /// explicit caller action.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Database(_) | Self::LibSql(_) | Self::Io(_)
        )
    }
}
