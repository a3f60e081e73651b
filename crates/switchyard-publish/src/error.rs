//! Publish error types

use std::path::PathBuf;
use switchyard_platform::PlatformError;
use thiserror::Error;

/// Errors produced by the publish workflow.
///
/// A function that does not exist yet is deliberately absent here: the
/// configuration fetch reports it structurally (`Ok(None)`) and the
/// orchestrator redirects into the create branch, so it never surfaces as a
/// failure. Everything the platforms reject passes through as
/// [`PublishError::Platform`] unchanged.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Artifact(#[from] switchyard_types::ArtifactError),

    #[error("failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration field {field} is required for {step}")]
    MissingConfigField {
        field: &'static str,
        step: &'static str,
    },

    #[error("role creation returned {actual}, but {requested} was requested")]
    RoleCreationMismatch { requested: String, actual: String },

    #[error("identity lookup returned no account id")]
    MissingAccountId,

    #[error("invocation of {function} failed: {message}")]
    InvocationFailed { function: String, message: String },

    #[error("verification predicate rejected the response from {function}")]
    VerificationFailed { function: String },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

/// Require an optional configuration field to be present for a given step.
///
/// Every workflow step checks its inputs through this one helper before
/// touching the network, so a missing field never turns into a remote call.
pub(crate) fn require<'a>(
    value: &'a Option<String>,
    field: &'static str,
    step: &'static str,
) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or(PublishError::MissingConfigField { field, step })
}
