//! Execution-role provisioning
//!
//! Brand-new functions need an execution role before the platform accepts
//! them. When the operator supplies an override it is used as given;
//! otherwise a role is synthesized from the function name, created with a
//! trust policy scoped to the compute-runtime principal, and granted basic
//! log-write access.

use crate::error::{PublishError, Result};
use std::sync::Arc;
use switchyard_platform::IdentityPlatform;
use switchyard_types::RoleSpec;
use tracing::info;

/// Trust policy allowing the compute runtime to assume provisioned roles
pub const COMPUTE_TRUST_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"Service":"lambda.amazonaws.com"},"Action":"sts:AssumeRole"}]}"#;

/// Managed policy granting log-write access to provisioned roles
pub const BASIC_EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Resolves or creates the execution role for a function
pub struct RoleProvisioner {
    identity: Arc<dyn IdentityPlatform>,
    role_override: Option<String>,
}

impl RoleProvisioner {
    pub fn new(identity: Arc<dyn IdentityPlatform>, role_override: Option<String>) -> Self {
        Self {
            identity,
            role_override,
        }
    }

    /// Resolve the role to attach to `function_name`.
    ///
    /// An explicit override wins unchanged. Otherwise a
    /// `<functionName>-role-<suffix>` role is created and the basic
    /// execution policy attached.
    pub async fn resolve_role(&self, function_name: &str) -> Result<RoleSpec> {
        if let Some(role) = &self.role_override {
            return Ok(RoleSpec::parse(role.clone()));
        }

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let role_name = format!("{function_name}-role-{}", &suffix[..8]);

        let created = self
            .identity
            .create_role(&role_name, COMPUTE_TRUST_POLICY)
            .await?;
        if created != role_name {
            return Err(PublishError::RoleCreationMismatch {
                requested: role_name,
                actual: created,
            });
        }

        self.identity
            .attach_role_policy(&role_name, BASIC_EXECUTION_POLICY_ARN)
            .await?;

        info!(function = function_name, role = %role_name, "execution role created");
        Ok(RoleSpec::Named(role_name))
    }

    /// Normalize a role reference into its fully-qualified form.
    ///
    /// Already-qualified references pass through; bare names are qualified
    /// against the caller's account.
    pub async fn validate(&self, role: &RoleSpec) -> Result<String> {
        match role {
            RoleSpec::Qualified(reference) => Ok(reference.clone()),
            RoleSpec::Named(name) => {
                let account_id = self
                    .identity
                    .caller_account_id()
                    .await?
                    .ok_or(PublishError::MissingAccountId)?;
                Ok(format!("arn:aws:iam::{account_id}:role/{name}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_platform::InMemoryIdentityPlatform;

    #[tokio::test]
    async fn bare_name_is_qualified_against_caller_account() {
        let identity = Arc::new(InMemoryIdentityPlatform::with_account("123456789012"));
        let provisioner = RoleProvisioner::new(identity, None);

        let qualified = provisioner
            .validate(&RoleSpec::Named("my-role".to_string()))
            .await
            .unwrap();
        assert_eq!(qualified, "arn:aws:iam::123456789012:role/my-role");
    }

    #[tokio::test]
    async fn qualified_reference_passes_through() {
        let identity = Arc::new(InMemoryIdentityPlatform::with_account("123456789012"));
        let provisioner = RoleProvisioner::new(identity, None);

        let reference = "arn:aws:iam::999999999999:role/preexisting";
        let qualified = provisioner
            .validate(&RoleSpec::Qualified(reference.to_string()))
            .await
            .unwrap();
        assert_eq!(qualified, reference);
    }

    #[tokio::test]
    async fn missing_account_id_fails_validation() {
        let identity = Arc::new(InMemoryIdentityPlatform::new());
        let provisioner = RoleProvisioner::new(identity, None);

        let err = provisioner
            .validate(&RoleSpec::Named("my-role".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::MissingAccountId));
    }

    #[tokio::test]
    async fn override_skips_role_creation() {
        let identity = Arc::new(InMemoryIdentityPlatform::with_account("123456789012"));
        let provisioner = RoleProvisioner::new(
            identity.clone(),
            Some("arn:aws:iam::123456789012:role/operator-role".to_string()),
        );

        let role = provisioner.resolve_role("my-function").await.unwrap();
        assert!(matches!(role, RoleSpec::Qualified(_)));
        assert!(identity.created_roles().is_empty());
    }

    #[tokio::test]
    async fn synthesized_role_gets_execution_policy() {
        let identity = Arc::new(InMemoryIdentityPlatform::with_account("123456789012"));
        let provisioner = RoleProvisioner::new(identity.clone(), None);

        let role = provisioner.resolve_role("my-function").await.unwrap();
        let name = role.as_str();
        assert!(name.starts_with("my-function-role-"));
        assert_eq!(
            identity.attached_policies(name),
            vec![BASIC_EXECUTION_POLICY_ARN.to_string()]
        );
    }
}
