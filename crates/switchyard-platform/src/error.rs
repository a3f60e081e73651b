//! Platform error types

use thiserror::Error;

/// Errors surfaced by the remote platforms.
///
/// `NotFound` is structural rather than string-matched on purpose: it is the
/// one classification the publish workflow branches on (a missing function
/// redirects into the create path). Everything else is opaque to callers and
/// propagates unchanged.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("stale revision id: {detail}")]
    RevisionConflict { detail: String },

    #[error("platform request failed: {0}")]
    Request(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PlatformError {
    /// Structured not-found for the given resource description
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
