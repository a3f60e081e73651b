//! Version publishing
//!
//! Locks the function's current code and configuration into a new
//! immutable, numbered version. Republishing always yields a new number;
//! existing versions are never overwritten.

use crate::error::require;
use crate::error::Result;
use std::sync::Arc;
use switchyard_platform::FunctionPlatform;
use switchyard_types::FunctionConfig;
use tracing::info;

/// Publishes the latest uploaded code as an immutable version
pub struct VersionPublisher {
    functions: Arc<dyn FunctionPlatform>,
}

impl VersionPublisher {
    pub fn new(functions: Arc<dyn FunctionPlatform>) -> Self {
        Self { functions }
    }

    /// Publish the function's current code as a new version.
    ///
    /// Requires `function_name` and `code_sha256`; a missing field fails
    /// before any network call is made. The returned configuration carries
    /// the assigned version number.
    pub async fn publish_latest(&self, config: &FunctionConfig) -> Result<FunctionConfig> {
        let function_name = require(&config.function_name, "function_name", "publish_latest")?;
        let code_sha256 = require(&config.code_sha256, "code_sha256", "publish_latest")?;

        let published = self
            .functions
            .publish_version(function_name, code_sha256)
            .await?;

        info!(
            function = function_name,
            version = published.version.as_deref().unwrap_or("?"),
            "version published"
        );
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;
    use switchyard_platform::InMemoryPlatform;

    #[tokio::test]
    async fn missing_code_hash_makes_no_network_call() {
        let platform = Arc::new(InMemoryPlatform::new());
        let publisher = VersionPublisher::new(platform.clone());

        let config = FunctionConfig {
            function_name: Some("my-function".to_string()),
            ..FunctionConfig::default()
        };
        let err = publisher.publish_latest(&config).await.unwrap_err();

        assert!(matches!(
            err,
            PublishError::MissingConfigField {
                field: "code_sha256",
                step: "publish_latest"
            }
        ));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn publishes_a_new_numbered_version() {
        let platform = Arc::new(InMemoryPlatform::new());
        platform.seed_function("my-function", "rev-1", b"code");
        let publisher = VersionPublisher::new(platform.clone());

        let config = platform
            .fetch_function("my-function")
            .await
            .unwrap()
            .unwrap();
        let published = publisher.publish_latest(&config).await.unwrap();

        assert_eq!(published.version.as_deref(), Some("2"));
    }
}
