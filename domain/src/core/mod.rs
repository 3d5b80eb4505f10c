//! Core domain concepts shared across all subdomains.
//!
//! - [`identity::IdentityContext`]: tenant, user and role of the caller
//! - [`error::FailureKind`]: the failure taxonomy surfaced to callers
//! - [`text`]: claim normalization and token helpers

pub mod error;
pub mod identity;
pub mod text;
