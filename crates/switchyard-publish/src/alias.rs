//! The alias switch
//!
//! Repointing the named alias is the only mutation live traffic can
//! observe. Callers must hold a configuration that has passed the
//! verification gate for exactly the version being switched to.

use crate::error::{require, Result};
use std::sync::Arc;
use switchyard_platform::FunctionPlatform;
use switchyard_types::{AliasPointer, FunctionConfig};
use tracing::info;

/// Atomically repoints the traffic alias to a verified version
pub struct AliasSwitcher {
    functions: Arc<dyn FunctionPlatform>,
}

impl AliasSwitcher {
    pub fn new(functions: Arc<dyn FunctionPlatform>) -> Self {
        Self { functions }
    }

    /// Move `alias_name` to the configuration's version
    pub async fn switch_alias(
        &self,
        config: &FunctionConfig,
        alias_name: &str,
    ) -> Result<AliasPointer> {
        let function_name = require(&config.function_name, "function_name", "switch_alias")?;
        let version = require(&config.version, "version", "switch_alias")?;

        let pointer = self
            .functions
            .update_alias(function_name, alias_name, version)
            .await?;

        info!(
            function = function_name,
            alias = alias_name,
            version, "alias switched"
        );
        Ok(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;
    use switchyard_platform::InMemoryPlatform;

    #[tokio::test]
    async fn repoints_existing_alias() {
        let platform = Arc::new(InMemoryPlatform::new());
        platform.seed_function("my-function", "rev-1", b"code");
        platform.seed_alias("my-function", "development", "1");

        let sha = platform
            .fetch_function("my-function")
            .await
            .unwrap()
            .unwrap()
            .code_sha256
            .unwrap();
        let published = platform.publish_version("my-function", &sha).await.unwrap();

        let pointer = AliasSwitcher::new(platform.clone())
            .switch_alias(&published, "development")
            .await
            .unwrap();

        assert_eq!(pointer.alias_name, "development");
        assert_eq!(pointer.target_version, "2");
    }

    #[tokio::test]
    async fn missing_version_never_touches_the_alias() {
        let platform = Arc::new(InMemoryPlatform::new());
        let config = FunctionConfig {
            function_name: Some("my-function".to_string()),
            ..FunctionConfig::default()
        };

        let err = AliasSwitcher::new(platform.clone())
            .switch_alias(&config, "development")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::MissingConfigField { field: "version", .. }
        ));
        assert_eq!(platform.call_count("update_alias"), 0);
    }
}
