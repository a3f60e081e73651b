//! Switchyard publish workflow
//!
//! Performs a zero-downtime rollout of a packaged function archive: create
//! or update the remote function, lock an immutable version, prove the new
//! version executes by invoking it, and only then repoint the stable traffic
//! alias. The alias switch is the single mutation live traffic can observe,
//! and no code path reaches it without a prior successful verification of
//! that exact version.
//!
//! Within one artifact every step is strictly sequential; across artifacts
//! the workflows run concurrently and independently.
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchyard_platform::{InMemoryIdentityPlatform, InMemoryPlatform};
//! use switchyard_publish::{PublishOptions, PublishOrchestrator};
//! use switchyard_types::DeployableArtifact;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let functions = Arc::new(InMemoryPlatform::new());
//! let identity = Arc::new(InMemoryIdentityPlatform::with_account("123456789012"));
//! let orchestrator = PublishOrchestrator::new(functions, identity, PublishOptions::default());
//!
//! let artifact = DeployableArtifact::from_location("build/my-function.zip")?;
//! let pointer = orchestrator.publish(&artifact, Arc::new(|_: &[u8]| true)).await?;
//! println!("{} -> {}", pointer.alias_name, pointer.target_version);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod alias;
pub mod error;
pub mod orchestrator;
pub mod roles;
pub mod verify;
pub mod version;

pub use alias::AliasSwitcher;
pub use error::{PublishError, Result};
pub use orchestrator::{PublishOptions, PublishOrchestrator, ResponseCheck};
pub use roles::RoleProvisioner;
pub use verify::VerificationGate;
pub use version::VersionPublisher;
