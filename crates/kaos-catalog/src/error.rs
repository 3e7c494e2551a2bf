//! Error types for catalog operations

use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failure talking to the catalog.
///
/// All three variants are remote-fetch failures from the compiler's point of view.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Connection, TLS, timeout, or body-read failure
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape, or carried GraphQL errors
    #[error("Unexpected catalog response: {0}")]
    Protocol(String),
}

impl CatalogError {
    /// HTTP status for [`CatalogError::Status`], if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Protocol(_) => None,
        }
    }
}
