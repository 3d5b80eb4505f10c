//! Domain layer for round-table
//!
//! This crate contains the deliberation entities, evidence rules, trust
//! arithmetic and consensus math. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Round Table
//!
//! A task is answered by several independent agents:
//!
//! - **Analysis**: each agent reports findings that must quote the input
//! - **Challenge**: agents object to or concede each other's findings
//! - **Synthesis**: findings are merged; majority claims become key findings
//! - **Vote**: agents approve or dissent, weighted by per-tenant trust
//!
//! ## Evidence
//!
//! Agents are untrusted. The [`evidence::EvidenceEnforcer`] is the only way
//! agent output becomes an accepted record.
//!
//! ## Visibility
//!
//! Agents are public, team (tenant) or private (owner). A single function,
//! [`agent::is_visible`], decides what a requester may see.

pub mod agent;
pub mod chat;
pub mod core;
pub mod evidence;
pub mod network;
pub mod roundtable;
pub mod trust;

// Re-export commonly used types
pub use agent::{
    AgentDescriptor, AgentOwner, AnalysisPayload, ChallengeItemPayload, ChallengePayload,
    FindingPayload, HealthStatus, InvocationMode, InvocationTarget, RemoteRegistration,
    Visibility, VotePayload,
};
pub use chat::{ChatRequest, ChatResponse, EscalationReason};
pub use core::{
    error::{DomainError, FailureKind, UserFacingError},
    identity::{IdentityContext, Role, TenantId, UserId},
};
pub use evidence::{ChallengeReview, EvidenceEnforcer, EvidenceLimits, RejectionReason};
pub use roundtable::{
    AgentAnalysis, AgentCallRecord, Artifact, ArtifactSummary, CallOutcome, Challenge,
    ChallengeKind, ConsensusOutcome, ConsensusPolicy, ConsensusReport, Decision, DegradedAgent,
    EvidenceCitation, Finding, FindingId, MergedFinding, Phase, PhaseWindow, RecordedRejection,
    Synthesis, Task, TaskId, TaskInput, TaskRequest, TaskSnapshot, TaskState, Vote, VoteTally,
    rank_artifacts,
};
pub use trust::{FeedbackSignal, TrustPolicy, TrustRecord};
