//! The publish orchestrator
//!
//! Sequences one artifact through the full workflow: resolve the function
//! name, fetch the remote configuration, branch into update or create,
//! publish an immutable version, verify it by invocation, and finally
//! switch the traffic alias. Each step depends on the previous step's
//! result; a batch of artifacts runs every workflow concurrently.
//!
//! All collaborators are injected at construction. The orchestrator holds
//! no global state and is safe to share behind an `Arc` across workflows.

use crate::alias::AliasSwitcher;
use crate::error::{require, PublishError, Result};
use crate::roles::RoleProvisioner;
use crate::verify::{VerificationGate, SETTLE_DELAY};
use crate::version::VersionPublisher;
use futures::future;
use std::sync::Arc;
use std::time::Duration;
use switchyard_platform::{CreateFunctionRequest, FunctionPlatform, IdentityPlatform};
use switchyard_types::{AliasPointer, DeployableArtifact, FunctionConfig};
use tracing::{info, warn};

/// Version number assigned by the platform when a function is created
const FIRST_VERSION: &str = "1";

/// Handler identifier for created functions
pub const DEFAULT_HANDLER: &str = "bootstrap";

/// Runtime identifier for created functions
pub const DEFAULT_RUNTIME: &str = "provided.al2023";

/// Caller-supplied judgement over the verification response bytes
pub type ResponseCheck = Arc<dyn Fn(&[u8]) -> bool + Send + Sync>;

/// Options shared by every artifact in a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Traffic alias to switch after verification
    pub alias_name: String,

    /// Execution role override; when set, no role is provisioned
    pub role_override: Option<String>,

    /// Payload for the verification invoke
    pub payload: Vec<u8>,

    /// Handler identifier used when creating functions
    pub handler: String,

    /// Runtime identifier used when creating functions
    pub runtime: String,

    /// Pause between publishing and verification
    pub settle_delay: Duration,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            alias_name: "development".to_string(),
            role_override: None,
            payload: Vec::new(),
            handler: DEFAULT_HANDLER.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Drives artifacts through the publish workflow
pub struct PublishOrchestrator {
    functions: Arc<dyn FunctionPlatform>,
    provisioner: RoleProvisioner,
    publisher: VersionPublisher,
    gate: VerificationGate,
    switcher: AliasSwitcher,
    options: PublishOptions,
}

impl PublishOrchestrator {
    pub fn new(
        functions: Arc<dyn FunctionPlatform>,
        identity: Arc<dyn IdentityPlatform>,
        options: PublishOptions,
    ) -> Self {
        Self {
            provisioner: RoleProvisioner::new(identity, options.role_override.clone()),
            publisher: VersionPublisher::new(functions.clone()),
            gate: VerificationGate::new(functions.clone()).with_settle_delay(options.settle_delay),
            switcher: AliasSwitcher::new(functions.clone()),
            functions,
            options,
        }
    }

    /// Publish a single artifact end to end.
    ///
    /// Returns the resulting alias pointer; the alias is only moved after
    /// the published version passed the verification gate.
    pub async fn publish(
        &self,
        artifact: &DeployableArtifact,
        check: ResponseCheck,
    ) -> Result<AliasPointer> {
        let function = artifact.function_name();
        info!(
            function,
            location = %artifact.location().display(),
            "publishing artifact"
        );

        match self.run(artifact, check).await {
            Ok(pointer) => {
                info!(
                    function,
                    alias = %pointer.alias_name,
                    version = %pointer.target_version,
                    "publish complete"
                );
                Ok(pointer)
            }
            Err(err) => {
                warn!(function, error = %err, "publish failed");
                Err(err)
            }
        }
    }

    /// Publish a batch of artifacts, one concurrent workflow each.
    ///
    /// Every workflow runs to completion before the batch is judged, so
    /// one artifact's failure never cancels a sibling already in flight.
    /// The aggregate result is the first failure in artifact order, or
    /// the alias pointers of all artifacts when everything succeeded.
    pub async fn publish_all(
        &self,
        artifacts: &[DeployableArtifact],
        check: ResponseCheck,
    ) -> Result<Vec<AliasPointer>> {
        let results = future::join_all(
            artifacts
                .iter()
                .map(|artifact| self.publish(artifact, Arc::clone(&check))),
        )
        .await;

        let mut pointers = Vec::with_capacity(results.len());
        let mut first_failure = None;
        for result in results {
            match result {
                Ok(pointer) => pointers.push(pointer),
                Err(err) => {
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(pointers),
        }
    }

    async fn run(
        &self,
        artifact: &DeployableArtifact,
        check: ResponseCheck,
    ) -> Result<AliasPointer> {
        let function_name = artifact.function_name();
        let code = tokio::fs::read(artifact.location())
            .await
            .map_err(|source| PublishError::ArtifactRead {
                path: artifact.location().to_path_buf(),
                source,
            })?;

        // A missing function is the structural branch point into creation;
        // any other fetch outcome propagates unchanged.
        let config = match self.functions.fetch_function(function_name).await? {
            Some(existing) => self.update_code(&existing, code).await?,
            None => self.create(function_name, code).await?,
        };

        let published = self.publisher.publish_latest(&config).await?;
        let verified = self
            .gate
            .verify(&published, &self.options.payload, &*check)
            .await?;
        self.switcher
            .switch_alias(&verified, &self.options.alias_name)
            .await
    }

    /// Updating branch: replace the code under the revision id observed by
    /// the immediately preceding fetch.
    async fn update_code(
        &self,
        existing: &FunctionConfig,
        code: Vec<u8>,
    ) -> Result<FunctionConfig> {
        let function_name = require(&existing.function_name, "function_name", "update_code")?;
        let revision_id = require(&existing.revision_id, "revision_id", "update_code")?;

        let config = self
            .functions
            .update_function_code(function_name, revision_id, code)
            .await?;
        Ok(config)
    }

    /// Creating branch: provision an execution role, create the function,
    /// and bootstrap the traffic alias at the first version so the
    /// post-verification switch has an alias to move.
    async fn create(&self, function_name: &str, code: Vec<u8>) -> Result<FunctionConfig> {
        let role = self.provisioner.resolve_role(function_name).await?;
        let role_reference = self.provisioner.validate(&role).await?;

        let config = self
            .functions
            .create_function(CreateFunctionRequest {
                function_name: function_name.to_string(),
                code,
                role: role_reference,
                handler: self.options.handler.clone(),
                runtime: self.options.runtime.clone(),
            })
            .await?;

        self.functions
            .create_alias(function_name, &self.options.alias_name, FIRST_VERSION)
            .await?;

        Ok(config)
    }
}
