//! Error types for folio-core.
//!
//! These never cross the boundary of the remote client: every public client
//! operation turns them into a safe default after logging. They exist so the
//! request helpers can use `?` and so callers building on the lower-level
//! helpers get a typed failure.

use thiserror::Error;

/// Result type alias using folio-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for folio operations
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream is still computing: {0}")]
    Pending(String),

    // Payload errors
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to parse manifest {path}: {message}")]
    Manifest { path: String, message: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a non-success upstream status
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a manifest parse error
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the upstream reported a computation in progress
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
