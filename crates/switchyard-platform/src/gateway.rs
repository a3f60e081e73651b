//! Platform capability traits
//!
//! These are the injection points for the publish workflow. Real adapters
//! talk to a remote control plane; the in-memory adapter backs tests and
//! local development. Implementations must be safe for concurrent use -
//! many artifact workflows share one adapter.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchyard_types::{AliasPointer, FunctionConfig, Invocation};

/// Parameters for creating a brand-new function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFunctionRequest {
    /// Function name
    pub function_name: String,

    /// Archive bytes to upload
    #[serde(skip)]
    pub code: Vec<u8>,

    /// Fully-qualified execution role
    pub role: String,

    /// Handler identifier
    pub handler: String,

    /// Runtime identifier
    pub runtime: String,
}

/// The remote function platform.
///
/// `fetch_function` returns `Ok(None)` for a function that does not exist -
/// that outcome redirects the workflow into its create branch and is never a
/// failure. Every other operation treats a missing target as an error.
#[async_trait]
pub trait FunctionPlatform: Send + Sync {
    /// Fetch the current configuration, or `None` if the function does
    /// not exist yet
    async fn fetch_function(&self, function_name: &str) -> Result<Option<FunctionConfig>>;

    /// Replace the function's code.
    ///
    /// `revision_id` must be the token from the immediately preceding fetch;
    /// a stale token is rejected by the platform.
    async fn update_function_code(
        &self,
        function_name: &str,
        revision_id: &str,
        code: Vec<u8>,
    ) -> Result<FunctionConfig>;

    /// Create a new function from scratch
    async fn create_function(&self, request: CreateFunctionRequest) -> Result<FunctionConfig>;

    /// Snapshot the current code and configuration into a new immutable,
    /// numbered version
    async fn publish_version(
        &self,
        function_name: &str,
        code_sha256: &str,
    ) -> Result<FunctionConfig>;

    /// Create a named alias pointing at a version
    async fn create_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer>;

    /// Repoint an existing alias at a version
    async fn update_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer>;

    /// Execute a function. `target` is either a bare name or the
    /// `<name>:<version>` qualified form.
    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<Invocation>;
}

/// The identity platform used when provisioning execution roles
#[async_trait]
pub trait IdentityPlatform: Send + Sync {
    /// Account identifier of the calling principal, if the identity
    /// lookup yields one
    async fn caller_account_id(&self) -> Result<Option<String>>;

    /// Create a role with the given trust policy; returns the name the
    /// platform actually recorded
    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<String>;

    /// Attach a managed policy to a role
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;
}
