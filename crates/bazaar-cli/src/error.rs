use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] bazaar_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Product ID cannot be empty")]
    EmptyProductId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Product not found for id/prefix: {0}")]
    ProductNotFound(String),
    #[error("{0}")]
    AmbiguousProductId(String),
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
    #[error(
        "Sync is not configured. Set TURSO_DATABASE_URL and TURSO_AUTH_TOKEN, or add sync_url and sync_auth_token to the config file."
    )]
    SyncNotConfigured,
}

impl CliError {
    /// Follow-up advice printed under the error, when there is any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Core(error) if error.is_transport() => Some(
                "The catalog store could not be reached; check --db-path and the TURSO_* settings.",
            ),
            Self::AmbiguousProductId(_) => Some("Use more characters of the ID."),
            _ => None,
        }
    }
}
