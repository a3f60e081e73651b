//! Alias pointers - the stable traffic endpoint

use serde::{Deserialize, Serialize};

/// A named, mutable pointer to an immutable function version.
///
/// This is the address clients actually call, and the only entity the
/// publish workflow mutates visibly to live traffic - and only after the
/// target version has passed verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasPointer {
    /// Function the alias belongs to
    pub function_name: String,

    /// Alias name, e.g. `development`
    pub alias_name: String,

    /// The version the alias currently routes to
    pub target_version: String,

    /// Optimistic-concurrency token for the alias record itself
    pub revision_id: Option<String>,
}
