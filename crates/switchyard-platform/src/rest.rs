//! REST adapter for the switchyard control plane
//!
//! Maps the platform traits onto a JSON API served by a control-plane
//! daemon. Code payloads travel as raw request bodies; control fields ride
//! in headers to keep archives out of JSON documents. HTTP 404 maps to the
//! structured `NotFound`, 409 to `RevisionConflict`; anything else
//! non-successful becomes an opaque request failure.

use crate::error::{PlatformError, Result};
use crate::gateway::{CreateFunctionRequest, FunctionPlatform, IdentityPlatform};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use switchyard_types::{AliasPointer, FunctionConfig, Invocation};

const REVISION_HEADER: &str = "x-switchyard-revision-id";
const FUNCTION_ERROR_HEADER: &str = "x-switchyard-function-error";

/// REST client implementing both platform traits
pub struct RestPlatform {
    client: Client,
    base_url: String,
}

impl RestPlatform {
    /// Connect to a control plane at `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => PlatformError::not_found(detail),
            StatusCode::CONFLICT => PlatformError::RevisionConflict { detail },
            _ => PlatformError::Request(format!("{status}: {detail}")),
        })
    }
}

#[async_trait]
impl FunctionPlatform for RestPlatform {
    async fn fetch_function(&self, function_name: &str) -> Result<Option<FunctionConfig>> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/functions/{function_name}")))
            .send()
            .await?;

        // Absence is a branch point for the caller, not a failure
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(self.decode(response).await?))
    }

    async fn update_function_code(
        &self,
        function_name: &str,
        revision_id: &str,
        code: Vec<u8>,
    ) -> Result<FunctionConfig> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/functions/{function_name}/code")))
            .header(REVISION_HEADER, revision_id)
            .body(code)
            .send()
            .await?;
        self.decode(response).await
    }

    async fn create_function(&self, request: CreateFunctionRequest) -> Result<FunctionConfig> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/functions/{}", request.function_name)))
            .query(&[
                ("role", request.role.as_str()),
                ("handler", request.handler.as_str()),
                ("runtime", request.runtime.as_str()),
            ])
            .body(request.code)
            .send()
            .await?;
        self.decode(response).await
    }

    async fn publish_version(
        &self,
        function_name: &str,
        code_sha256: &str,
    ) -> Result<FunctionConfig> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/functions/{function_name}/versions")))
            .json(&serde_json::json!({ "code_sha256": code_sha256 }))
            .send()
            .await?;
        self.decode(response).await
    }

    async fn create_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/v1/functions/{function_name}/aliases/{alias_name}"
            )))
            .json(&serde_json::json!({ "version": version }))
            .send()
            .await?;
        self.decode(response).await
    }

    async fn update_alias(
        &self,
        function_name: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<AliasPointer> {
        let response = self
            .client
            .put(self.url(&format!(
                "/api/v1/functions/{function_name}/aliases/{alias_name}"
            )))
            .json(&serde_json::json!({ "version": version }))
            .send()
            .await?;
        self.decode(response).await
    }

    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<Invocation> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/functions/{target}/invocations")))
            .body(payload)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let payload = response.bytes().await?.to_vec();

        Ok(Invocation {
            function_error,
            payload,
        })
    }
}

#[async_trait]
impl IdentityPlatform for RestPlatform {
    async fn caller_account_id(&self) -> Result<Option<String>> {
        #[derive(serde::Deserialize)]
        struct CallerIdentity {
            account_id: Option<String>,
        }

        let response = self
            .client
            .get(self.url("/api/v1/identity/caller"))
            .send()
            .await?;
        let identity: CallerIdentity = self.decode(response).await?;
        Ok(identity.account_id)
    }

    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct CreatedRole {
            name: String,
        }

        let response = self
            .client
            .post(self.url("/api/v1/roles"))
            .json(&serde_json::json!({
                "name": role_name,
                "trust_policy": trust_policy,
            }))
            .send()
            .await?;
        let created: CreatedRole = self.decode(response).await?;
        Ok(created.name)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/api/v1/roles/{role_name}/policies")))
            .json(&serde_json::json!({ "policy_arn": policy_arn }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Answers a single request with the given status and body, then closes
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut total = 0;
            loop {
                let n = socket.read(&mut buf[total..]).await.unwrap();
                total += n;
                let request = String::from_utf8_lossy(&buf[..total]);
                if let Some(header_end) = request.find("\r\n\r\n") {
                    let content_length = request
                        .lines()
                        .find_map(|line| {
                            let lowered = line.to_ascii_lowercase();
                            let value = lowered.strip_prefix("content-length:")?;
                            value.trim().parse::<usize>().ok()
                        })
                        .unwrap_or(0);
                    if total >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        addr
    }

    #[tokio::test]
    async fn missing_function_reads_as_absent() {
        let addr = one_shot_server("404 Not Found", "function ghost not found").await;
        let platform = RestPlatform::new(&format!("http://{addr}")).unwrap();

        let fetched = platform.fetch_function("ghost").await.unwrap();

        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn conflict_response_maps_to_revision_conflict() {
        let addr = one_shot_server("409 Conflict", "expected rev-2, request carried rev-1").await;
        let platform = RestPlatform::new(&format!("http://{addr}")).unwrap();

        let err = platform
            .update_function_code("my-function", "rev-1", b"code".to_vec())
            .await
            .unwrap_err();

        match err {
            PlatformError::RevisionConflict { detail } => {
                assert!(detail.contains("rev-1"));
            }
            other => panic!("expected RevisionConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_stay_opaque() {
        let addr = one_shot_server("500 Internal Server Error", "boom").await;
        let platform = RestPlatform::new(&format!("http://{addr}")).unwrap();

        let err = platform
            .publish_version("my-function", "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, PlatformError::Request(_)));
    }
}
