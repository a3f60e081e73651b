//! The verification gate
//!
//! Proves a freshly published version actually executes before any traffic
//! is pointed at it. The gate waits a fixed settle delay first - the
//! platform propagates new versions eventually, and invoking too early
//! reports spurious failures. The delay is a concession to that propagation
//! lag, not a correctness guarantee.
//!
//! The gate performs exactly one invocation: user code is not idempotent in
//! general, so there is no retry loop behind it.

use crate::error::{require, PublishError, Result};
use std::sync::Arc;
use std::time::Duration;
use switchyard_platform::FunctionPlatform;
use switchyard_types::FunctionConfig;
use tracing::{debug, info};

/// Default pause between publishing and the verification invoke
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Invokes a specific version and applies a caller-supplied check to the
/// raw response bytes
pub struct VerificationGate {
    functions: Arc<dyn FunctionPlatform>,
    settle_delay: Duration,
}

impl VerificationGate {
    pub fn new(functions: Arc<dyn FunctionPlatform>) -> Self {
        Self {
            functions,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Override the settle delay (tests use zero)
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Invoke `<functionName>:<version>` with `payload` and judge the
    /// response with `check`.
    ///
    /// Fails with [`PublishError::InvocationFailed`] when the executed code
    /// itself reported an error, and [`PublishError::VerificationFailed`]
    /// when `check` rejects the response. On success the configuration is
    /// returned unchanged and is considered release-eligible.
    pub async fn verify(
        &self,
        config: &FunctionConfig,
        payload: &[u8],
        check: &(dyn Fn(&[u8]) -> bool + Send + Sync),
    ) -> Result<FunctionConfig> {
        let function_name = require(&config.function_name, "function_name", "verify")?;
        let version = require(&config.version, "version", "verify")?;
        let target = format!("{function_name}:{version}");

        debug!(target_version = %target, delay = ?self.settle_delay, "settling before verification");
        tokio::time::sleep(self.settle_delay).await;

        let invocation = self.functions.invoke(&target, payload.to_vec()).await?;

        if let Some(message) = invocation.function_error {
            return Err(PublishError::InvocationFailed {
                function: target,
                message,
            });
        }

        if !check(&invocation.payload) {
            return Err(PublishError::VerificationFailed {
                function: function_name.to_string(),
            });
        }

        info!(target_version = %target, "verification passed");
        Ok(config.clone())
    }
}
