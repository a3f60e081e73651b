//! Deployable artifacts and function-name resolution
//!
//! The external build pipeline hands us a packaged archive. The only contract
//! with it is the location: the final path segment, minus its `.zip` suffix,
//! is the function name. The name is fixed at construction and never changes
//! for the rest of the workflow.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors arising from artifact handling
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not derive a function name from artifact location: {location}")]
    NameResolution { location: PathBuf },
}

/// A packaged, deployable code bundle produced by the build pipeline
///
/// Immutable once constructed; consumed once per publish attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployableArtifact {
    location: PathBuf,
    function_name: String,
}

impl DeployableArtifact {
    /// Derive an artifact from an archive location.
    ///
    /// The last path segment is expected to be `<name>.zip`; the suffix is
    /// stripped if present. A location whose stem is empty (for example a
    /// path ending in just `.zip`) fails with
    /// [`ArtifactError::NameResolution`].
    pub fn from_location(location: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let location = location.into();

        let segment = location
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let name = segment.strip_suffix(".zip").unwrap_or(segment);

        if name.is_empty() {
            return Err(ArtifactError::NameResolution { location });
        }

        Ok(Self {
            function_name: name.to_string(),
            location,
        })
    }

    /// Archive location on disk
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The function name derived from the archive location
    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_zip_suffix() {
        let artifact = DeployableArtifact::from_location("/build/out/my-function.zip").unwrap();
        assert_eq!(artifact.function_name(), "my-function");
    }

    #[test]
    fn bare_segment_is_used_as_is() {
        let artifact = DeployableArtifact::from_location("target/lambda/imageproc").unwrap();
        assert_eq!(artifact.function_name(), "imageproc");
    }

    #[test]
    fn empty_stem_fails() {
        let err = DeployableArtifact::from_location("/build/out/.zip").unwrap_err();
        assert!(matches!(err, ArtifactError::NameResolution { .. }));
    }

    #[test]
    fn location_is_preserved() {
        let artifact = DeployableArtifact::from_location("a/b/fn.zip").unwrap();
        assert_eq!(artifact.location(), Path::new("a/b/fn.zip"));
    }
}
