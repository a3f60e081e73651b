//! Remote function configuration and invocation results

use serde::{Deserialize, Serialize};

/// A snapshot of a remote function's configuration.
///
/// Ephemeral by design: refetched at the start of every publish attempt and
/// never cached across attempts. Every field is optional because the remote
/// platform populates them at different points in the function's lifecycle -
/// the publish steps each state which fields they require.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Function name, fixed once resolved from the artifact
    pub function_name: Option<String>,

    /// Optimistic-concurrency token; must be the most recently observed
    /// value before any code update, or the platform rejects the write
    pub revision_id: Option<String>,

    /// Hash of the currently uploaded code; required before a version
    /// can be published
    pub code_sha256: Option<String>,

    /// Immutable version number, assigned only by a successful publish
    pub version: Option<String>,

    /// Execution role attached to the function
    pub role: Option<String>,
}

/// The raw result of invoking a function.
///
/// `function_error` is set when the invoked code itself crashed or threw;
/// transport-level failures surface as platform errors instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invocation {
    /// Error reported by the executed code, if any
    pub function_error: Option<String>,

    /// Raw response payload bytes
    pub payload: Vec<u8>,
}

impl Invocation {
    /// An invocation that succeeded with the given payload
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            function_error: None,
            payload: payload.into(),
        }
    }

    /// An invocation whose executed code reported an error
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            function_error: Some(message.into()),
            payload: Vec::new(),
        }
    }
}
