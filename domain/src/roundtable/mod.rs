//! Round table deliberation
//!
//! A task moves through independent analysis, cross-examination, synthesis
//! and a trust-weighted vote before it is recorded as an immutable
//! [`Artifact`].

pub mod artifact;
pub mod challenge;
pub mod consensus;
pub mod finding;
pub mod synthesis;
pub mod task;
pub mod vote;

pub use artifact::{
    AgentCallRecord, Artifact, ArtifactSummary, CallOutcome, DegradedAgent, PhaseWindow,
    RecordedRejection, rank_artifacts,
};
pub use challenge::{Challenge, ChallengeKind};
pub use consensus::{ConsensusOutcome, ConsensusPolicy, ConsensusReport, weighted_approval};
pub use finding::{AgentAnalysis, EvidenceCitation, Finding, FindingId};
pub use synthesis::{MergedFinding, Synthesis, synthesize};
pub use task::{Phase, Task, TaskId, TaskInput, TaskRequest, TaskSnapshot, TaskState};
pub use vote::{Decision, Vote, VoteTally};
