//! In-memory implementations of the platform traits
//!
//! Suitable for development and tests. The function platform models the
//! parts of the remote API the publish workflow depends on: revision-id
//! optimistic concurrency, real code hashes, immutable numbered versions
//! (creation publishes version `"1"`, each later publish increments), and
//! alias records. It also keeps an ordered call log so tests can assert
//! sequencing properties such as "the alias was never touched".

use crate::error::{PlatformError, Result};
use crate::gateway::{CreateFunctionRequest, FunctionPlatform, IdentityPlatform};
use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use switchyard_types::{AliasPointer, FunctionConfig, Invocation};

fn sha256_hex(code: &[u8]) -> String {
    Sha256::digest(code)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn new_revision_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

struct StoredFunction {
    revision_id: String,
    code_sha256: String,
    role: String,
}

struct VersionRecord {
    version: String,
    code_sha256: String,
}

/// In-memory function platform
#[derive(Default)]
pub struct InMemoryPlatform {
    functions: DashMap<String, StoredFunction>,
    versions: DashMap<String, Vec<VersionRecord>>,
    aliases: DashMap<(String, String), AliasPointer>,
    invoke_responses: DashMap<String, Invocation>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing function with a known revision id, as if it had
    /// been created and published (version `"1"`) in an earlier run.
    pub fn seed_function(&self, function_name: &str, revision_id: &str, code: &[u8]) {
        let sha = sha256_hex(code);
        self.functions.insert(
            function_name.to_string(),
            StoredFunction {
                revision_id: revision_id.to_string(),
                code_sha256: sha.clone(),
                role: format!("arn:aws:iam::000000000000:role/{function_name}-role"),
            },
        );
        self.versions.entry(function_name.to_string()).or_default().push(VersionRecord {
            version: "1".to_string(),
            code_sha256: sha,
        });
    }

    /// Seed an alias record directly
    pub fn seed_alias(&self, function_name: &str, alias_name: &str, version: &str) {
        self.aliases.insert(
            (function_name.to_string(), alias_name.to_string()),
            AliasPointer {
                function_name: function_name.to_string(),
                alias_name: alias_name.to_string(),
                target_version: version.to_string(),
                revision_id: Some(new_revision_id()),
            },
        );
    }

    /// Program the result of invoking `target` (`name` or `name:version`)
    pub fn set_invoke_response(&self, target: &str, response: Invocation) {
        self.invoke_responses.insert(target.to_string(), response);
    }

    /// Ordered log of every operation performed against this platform
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of logged calls whose operation name matches `op`
    pub fn call_count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|entry| entry.split_whitespace().next() == Some(op))
            .count()
    }

    fn record(&self, entry: String) {
        self.calls.lock().expect("call log poisoned").push(entry);
    }

    fn config_of(&self, function_name: &str, stored: &StoredFunction) -> FunctionConfig {
        FunctionConfig {
            function_name: Some(function_name.to_string()),
            revision_id: Some(stored.revision_id.clone()),
            code_sha256: Some(stored.code_sha256.clone()),
            version: None,
            role: Some(stored.role.clone()),
        }
    }

    fn version_exists(&self, function_name: &str, version: &str) -> bool {
        self.versions
            .get(function_name)
            .map(|records| records.iter().any(|r| r.version == version))
            .unwrap_or(false)
    }
}

#[async_trait]
impl FunctionPlatform for InMemoryPlatform {
    async fn fetch_function(&self, function_name: &str) -> Result<Option<FunctionConfig>> {
        self.record(format!("fetch_function {function_name}"));
        Ok(self
            .functions
            .get(function_name)
            .map(|stored| self.config_of(function_name, &stored)))
    }

    async fn update_function_code(
        &self,
        function_name: &str,
        revision_id: &str,
        code: Vec<u8>,
    ) -> Result<FunctionConfig> {
        self.record(format!("update_function_code {function_name} {revision_id}"));

        let mut stored = self
            .functions
            .get_mut(function_name)
            .ok_or_else(|| PlatformError::not_found(format!("function {function_name}")))?;

        if stored.revision_id != revision_id {
            return Err(PlatformError::RevisionConflict {
                detail: format!(
                    "expected {}, request carried {revision_id}",
                    stored.revision_id
                ),
            });
        }

        stored.code_sha256 = sha256_hex(&code);
        stored.revision_id = new_revision_id();
        Ok(self.config_of(function_name, &stored))
    }

    async fn create_function(&self, request: CreateFunctionRequest) -> Result<FunctionConfig> {
        self.record(format!("create_function {}", request.function_name));

        if self.functions.contains_key(&request.function_name) {
            return Err(PlatformError::Request(format!(
                "function {} already exists",
                request.function_name
            )));
        }

        let sha = sha256_hex(&request.code);
        let stored = StoredFunction {
            revision_id: new_revision_id(),
            code_sha256: sha.clone(),
            role: request.role,
        };
        let config = self.config_of(&request.function_name, &stored);
        self.functions.insert(request.function_name.clone(), stored);

        // Creation publishes the first immutable version, so a bootstrap
        // alias at "1" has something to point at.
        self.versions
            .entry(request.function_name)
            .or_default()
            .push(VersionRecord {
                version: "1".to_string(),
                code_sha256: sha,
            });

        Ok(config)
    }

    async fn publish_version(
        &self,
        function_name: &str,
        code_sha256: &str,
    ) -> Result<FunctionConfig> {
        self.record(format!("publish_version {function_name}"));

        let stored = self
            .functions
            .get(function_name)
            .ok_or_else(|| PlatformError::not_found(format!("function {function_name}")))?;

        if stored.code_sha256 != code_sha256 {
            return Err(PlatformError::Request(format!(
                "code hash mismatch for {function_name}: uploaded code has changed"
            )));
        }

        let mut records = self.versions.entry(function_name.to_string()).or_default();
        let version = (records.len() + 1).to_string();
        records.push(VersionRecord {
            version: version.clone(),
            code_sha256: code_sha256.to_string(),
        });

        let mut config = self.config_of(function_name, &stored);
        config.version = Some(version);
        Ok(config)
    }

    async fn create_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer> {
        self.record(format!("create_alias {function_name} {alias_name} {version}"));

        if !self.functions.contains_key(function_name) {
            return Err(PlatformError::not_found(format!("function {function_name}")));
        }
        if !self.version_exists(function_name, version) {
            return Err(PlatformError::not_found(format!(
                "version {function_name}:{version}"
            )));
        }

        let key = (function_name.to_string(), alias_name.to_string());
        if self.aliases.contains_key(&key) {
            return Err(PlatformError::Request(format!(
                "alias {alias_name} already exists on {function_name}"
            )));
        }

        let pointer = AliasPointer {
            function_name: function_name.to_string(),
            alias_name: alias_name.to_string(),
            target_version: version.to_string(),
            revision_id: Some(new_revision_id()),
        };
        self.aliases.insert(key, pointer.clone());
        Ok(pointer)
    }

    async fn update_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer> {
        self.record(format!("update_alias {function_name} {alias_name} {version}"));

        if !self.version_exists(function_name, version) {
            return Err(PlatformError::not_found(format!(
                "version {function_name}:{version}"
            )));
        }

        let key = (function_name.to_string(), alias_name.to_string());
        let mut pointer = self
            .aliases
            .get_mut(&key)
            .ok_or_else(|| {
                PlatformError::not_found(format!("alias {alias_name} on {function_name}"))
            })?;
        pointer.target_version = version.to_string();
        pointer.revision_id = Some(new_revision_id());
        Ok(pointer.clone())
    }

    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<Invocation> {
        self.record(format!("invoke {target}"));

        let (function_name, version) = match target.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (target, None),
        };

        if !self.functions.contains_key(function_name) {
            return Err(PlatformError::not_found(format!("function {function_name}")));
        }
        if let Some(version) = version {
            if !self.version_exists(function_name, version) {
                return Err(PlatformError::not_found(format!(
                    "version {function_name}:{version}"
                )));
            }
        }

        if let Some(programmed) = self
            .invoke_responses
            .get(target)
            .or_else(|| self.invoke_responses.get(function_name))
        {
            return Ok(programmed.clone());
        }

        // Default behaviour: echo the request payload back
        Ok(Invocation::ok(payload))
    }
}

/// In-memory identity platform
pub struct InMemoryIdentityPlatform {
    account_id: Option<String>,
    roles: DashMap<String, Vec<String>>,
    created_roles: Mutex<Vec<String>>,
}

impl InMemoryIdentityPlatform {
    /// Identity platform with no resolvable account
    pub fn new() -> Self {
        Self {
            account_id: None,
            roles: DashMap::new(),
            created_roles: Mutex::new(Vec::new()),
        }
    }

    /// Identity platform whose caller resolves to `account_id`
    pub fn with_account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            ..Self::new()
        }
    }

    /// Names of roles created through this platform, in order
    pub fn created_roles(&self) -> Vec<String> {
        self.created_roles.lock().expect("role log poisoned").clone()
    }

    /// Managed policies attached to a role
    pub fn attached_policies(&self, role_name: &str) -> Vec<String> {
        self.roles
            .get(role_name)
            .map(|policies| policies.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryIdentityPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityPlatform for InMemoryIdentityPlatform {
    async fn caller_account_id(&self) -> Result<Option<String>> {
        Ok(self.account_id.clone())
    }

    async fn create_role(&self, role_name: &str, _trust_policy: &str) -> Result<String> {
        self.roles.insert(role_name.to_string(), Vec::new());
        self.created_roles
            .lock()
            .expect("role log poisoned")
            .push(role_name.to_string());
        Ok(role_name.to_string())
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        let mut policies = self
            .roles
            .get_mut(role_name)
            .ok_or_else(|| PlatformError::not_found(format!("role {role_name}")))?;
        policies.push(policy_arn.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_missing_function_is_none() {
        let platform = InMemoryPlatform::new();
        assert!(platform.fetch_function("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_rejects_stale_revision() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"old code");

        let err = platform
            .update_function_code("fn-a", "rev-0", b"new code".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::RevisionConflict { .. }));
    }

    #[tokio::test]
    async fn update_rotates_revision_and_hash() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"old code");

        let config = platform
            .update_function_code("fn-a", "rev-1", b"new code".to_vec())
            .await
            .unwrap();
        assert_ne!(config.revision_id.as_deref(), Some("rev-1"));
        assert_eq!(config.code_sha256.as_deref(), Some(sha256_hex(b"new code").as_str()));
    }

    #[tokio::test]
    async fn versions_number_upward_from_creation() {
        let platform = InMemoryPlatform::new();
        let config = platform
            .create_function(CreateFunctionRequest {
                function_name: "fn-a".to_string(),
                code: b"code".to_vec(),
                role: "arn:aws:iam::123:role/r".to_string(),
                handler: "bootstrap".to_string(),
                runtime: "provided.al2023".to_string(),
            })
            .await
            .unwrap();

        let sha = config.code_sha256.unwrap();
        let published = platform.publish_version("fn-a", &sha).await.unwrap();
        // Creation already snapshotted "1"
        assert_eq!(published.version.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn alias_update_requires_existing_alias() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"code");

        let err = platform.update_alias("fn-a", "development", "1").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));

        platform.create_alias("fn-a", "development", "1").await.unwrap();
        let pointer = platform.update_alias("fn-a", "development", "1").await.unwrap();
        assert_eq!(pointer.target_version, "1");
    }

    #[tokio::test]
    async fn invoke_echoes_payload_by_default() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"code");

        let result = platform.invoke("fn-a:1", b"ping".to_vec()).await.unwrap();
        assert!(result.function_error.is_none());
        assert_eq!(result.payload, b"ping");
    }

    #[tokio::test]
    async fn programmed_invoke_response_wins() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"code");
        platform.set_invoke_response("fn-a:1", Invocation::failed("boom"));

        let result = platform.invoke("fn-a:1", Vec::new()).await.unwrap();
        assert_eq!(result.function_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn call_log_preserves_order() {
        let platform = InMemoryPlatform::new();
        platform.seed_function("fn-a", "rev-1", b"code");
        platform.fetch_function("fn-a").await.unwrap();
        platform.invoke("fn-a", Vec::new()).await.unwrap();

        assert_eq!(
            platform.calls(),
            vec!["fetch_function fn-a".to_string(), "invoke fn-a".to_string()]
        );
        assert_eq!(platform.call_count("update_alias"), 0);
    }
}
