//! Switchyard platform seams
//!
//! The publish workflow talks to two external collaborators: the remote
//! function platform (configuration, code upload, versions, aliases,
//! invocation) and the identity platform (caller account, role creation).
//! Both are expressed as capability traits injected at construction time,
//! implemented here by an in-memory adapter for development and tests and
//! a reqwest-based REST adapter for a real control plane.

#![deny(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod memory;
pub mod rest;

pub use error::{PlatformError, Result};
pub use gateway::{CreateFunctionRequest, FunctionPlatform, IdentityPlatform};
pub use memory::{InMemoryIdentityPlatform, InMemoryPlatform};
pub use rest::RestPlatform;
