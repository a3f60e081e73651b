//! CLI error types

use thiserror::Error;

/// Errors surfaced to the operator
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Artifact(#[from] switchyard_types::ArtifactError),

    #[error(transparent)]
    Platform(#[from] switchyard_platform::PlatformError),

    #[error(transparent)]
    Publish(#[from] switchyard_publish::PublishError),

    #[error("could not read payload file {path}: {source}")]
    PayloadFile {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;
