//! Agent descriptors, visibility and the lenient wire payloads agents return.
//!
//! The invocation handle itself (the `Agent` trait) lives in the application
//! layer; the domain only knows what an agent is, who may see it, and what
//! shape its answers take before validation.

pub mod descriptor;
pub mod payload;
pub mod registration;
pub mod visibility;

pub use descriptor::{AgentDescriptor, AgentOwner, HealthStatus, InvocationTarget};
pub use payload::{
    AnalysisPayload, ChallengeItemPayload, ChallengePayload, FindingPayload, VotePayload,
};
pub use registration::{InvocationMode, RemoteRegistration};
pub use visibility::{Visibility, is_visible};
