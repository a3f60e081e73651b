//! Execution-role references

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to an execution role.
///
/// Either an already-qualified identity reference (passed through untouched)
/// or a bare name that still needs resolution against the caller's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleSpec {
    /// Fully-qualified identity reference, e.g. `arn:aws:iam::123:role/x`
    Qualified(String),

    /// Bare role name requiring account resolution
    Named(String),
}

impl RoleSpec {
    /// Classify a role reference by its shape
    pub fn parse(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        if reference.starts_with("arn:") {
            Self::Qualified(reference)
        } else {
            Self::Named(reference)
        }
    }

    /// Bare name or full reference, whichever this is
    pub fn as_str(&self) -> &str {
        match self {
            Self::Qualified(s) | Self::Named(s) => s,
        }
    }
}

impl fmt::Display for RoleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arn_prefix_is_qualified() {
        let spec = RoleSpec::parse("arn:aws:iam::123456789012:role/my-role");
        assert!(matches!(spec, RoleSpec::Qualified(_)));
    }

    #[test]
    fn bare_name_needs_resolution() {
        let spec = RoleSpec::parse("my-role");
        assert_eq!(spec, RoleSpec::Named("my-role".to_string()));
    }
}
