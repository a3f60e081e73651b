//! Switchyard core types
//!
//! The shared data model for the publish workflow: deployable artifacts,
//! remote function configuration, alias pointers, and role references.
//! This crate is pure data - all I/O lives behind the platform traits in
//! `switchyard-platform`.

#![deny(unsafe_code)]

pub mod alias;
pub mod artifact;
pub mod function;
pub mod role;

pub use alias::AliasPointer;
pub use artifact::{ArtifactError, DeployableArtifact};
pub use function::{FunctionConfig, Invocation};
pub use role::RoleSpec;
