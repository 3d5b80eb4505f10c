//! Deliberation artifact
//!
//! The immutable record of a finalized task. Stores only ever append
//! artifacts; nothing rewrites one after it is saved.

use super::challenge::Challenge;
use super::consensus::ConsensusOutcome;
use super::finding::AgentAnalysis;
use super::synthesis::Synthesis;
use super::task::{Phase, TaskId};
use super::vote::Vote;
use crate::core::error::FailureKind;
use crate::core::identity::{TenantId, UserId};
use crate::core::text::tokenize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Start and end of one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWindow {
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// How a single agent call ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Accepted,
    Rejected { kind: FailureKind, reason: String },
    TimedOut,
    Failed { reason: String },
    Cancelled,
}

impl CallOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CallOutcome::Accepted)
    }
}

/// One agent call in one phase, including retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCallRecord {
    pub agent: String,
    pub phase: Phase,
    pub attempts: u8,
    pub resolved_at: DateTime<Utc>,
    pub outcome: CallOutcome,
}

/// Agent excluded from the rest of the task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedAgent {
    pub agent: String,
    pub phase: Phase,
    pub kind: FailureKind,
    pub reason: String,
}

/// Agent output the evidence enforcer refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRejection {
    pub agent: String,
    pub phase: Phase,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub task_id: TaskId,
    pub tenant_id: TenantId,
    pub submitted_by: UserId,
    pub query: String,
    pub tags: Vec<String>,
    /// Agents dispatched in the first agent phase
    pub participants: Vec<String>,
    pub strategy_note: Option<String>,
    pub analyses: Vec<AgentAnalysis>,
    pub challenges: Vec<Challenge>,
    pub synthesis: Synthesis,
    pub votes: Vec<Vote>,
    pub consensus_rate: f64,
    pub approval_rate: f64,
    pub weighted_approval: Option<f64>,
    pub outcome: ConsensusOutcome,
    pub requires_human_review: bool,
    pub degraded: Vec<DegradedAgent>,
    pub rejections: Vec<RecordedRejection>,
    pub calls: Vec<AgentCallRecord>,
    pub phases: Vec<PhaseWindow>,
    pub created_at: DateTime<Utc>,
    pub finalized_at: DateTime<Utc>,
}

impl Artifact {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseWindow> {
        self.phases.iter().find(|w| w.phase == phase)
    }

    pub fn calls_in(&self, phase: Phase) -> impl Iterator<Item = &AgentCallRecord> {
        self.calls.iter().filter(move |c| c.phase == phase)
    }

    pub fn is_degraded(&self, agent: &str) -> bool {
        self.degraded.iter().any(|d| d.agent == agent)
    }

    /// Every call of each phase resolved before the next phase started.
    pub fn barriers_hold(&self) -> bool {
        self.phases.windows(2).all(|pair| {
            let (earlier, later) = (&pair[0], &pair[1]);
            earlier.completed_at <= later.started_at
                && self
                    .calls_in(earlier.phase)
                    .all(|c| c.resolved_at <= later.started_at)
        })
    }

    /// Text indexed for search: query, tags and every finding claim.
    pub fn search_tokens(&self) -> BTreeSet<String> {
        let mut tokens = tokenize(&self.query);
        for tag in &self.tags {
            tokens.extend(tokenize(tag));
        }
        for finding in self.synthesis.all_findings() {
            tokens.extend(tokenize(&finding.claim));
        }
        tokens
    }

    /// Number of query tokens the artifact contains.
    pub fn match_score(&self, query_tokens: &BTreeSet<String>) -> usize {
        let own = self.search_tokens();
        query_tokens.intersection(&own).count()
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            task_id: self.task_id.clone(),
            query: self.query.clone(),
            outcome: self.outcome,
            consensus_rate: self.consensus_rate,
            requires_human_review: self.requires_human_review,
            created_at: self.created_at,
            score: 0,
        }
    }
}

/// Search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub task_id: TaskId,
    pub query: String,
    pub outcome: ConsensusOutcome,
    pub consensus_rate: f64,
    pub requires_human_review: bool,
    pub created_at: DateTime<Utc>,
    pub score: usize,
}

/// Rank artifacts against a free-text query, best first.
///
/// Ties go to the newer artifact. Artifacts sharing no token are skipped.
pub fn rank_artifacts<'a>(
    artifacts: impl IntoIterator<Item = &'a Artifact>,
    query: &str,
    limit: usize,
) -> Vec<ArtifactSummary> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<ArtifactSummary> = artifacts
        .into_iter()
        .filter_map(|artifact| {
            let score = artifact.match_score(&query_tokens);
            (score > 0).then(|| ArtifactSummary {
                score,
                ..artifact.summary()
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roundtable::synthesis::synthesize;
    use chrono::Duration;

    fn artifact(query: &str) -> Artifact {
        let now = Utc::now();
        Artifact {
            task_id: TaskId::generate(),
            tenant_id: TenantId::new("acme"),
            submitted_by: UserId::new("alice"),
            query: query.to_string(),
            tags: vec![],
            participants: vec!["a".into()],
            strategy_note: None,
            analyses: vec![],
            challenges: vec![],
            synthesis: synthesize(&[], &[]),
            votes: vec![],
            consensus_rate: 0.0,
            approval_rate: 0.0,
            weighted_approval: None,
            outcome: ConsensusOutcome::Undetermined,
            requires_human_review: true,
            degraded: vec![],
            rejections: vec![],
            calls: vec![],
            phases: vec![],
            created_at: now,
            finalized_at: now,
        }
    }

    #[test]
    fn test_rank_artifacts() {
        let a = artifact("supplier contract termination clause");
        let b = artifact("quarterly revenue forecast");
        let c = artifact("contract renewal pricing");
        let hits = rank_artifacts([&a, &b, &c], "contract termination", 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].task_id, a.task_id);
        assert_eq!(hits[0].score, 2);
        assert_eq!(hits[1].task_id, c.task_id);
    }

    #[test]
    fn test_rank_respects_limit_and_empty_query() {
        let a = artifact("contract one");
        let b = artifact("contract two");
        assert_eq!(rank_artifacts([&a, &b], "contract", 1).len(), 1);
        assert!(rank_artifacts([&a, &b], "the", 10).is_empty());
    }

    #[test]
    fn test_barriers_hold() {
        let mut art = artifact("x");
        let t0 = Utc::now();
        art.phases = vec![
            PhaseWindow {
                phase: Phase::Analyzing,
                started_at: t0,
                completed_at: t0 + Duration::milliseconds(10),
            },
            PhaseWindow {
                phase: Phase::Challenging,
                started_at: t0 + Duration::milliseconds(11),
                completed_at: t0 + Duration::milliseconds(20),
            },
        ];
        art.calls = vec![AgentCallRecord {
            agent: "a".into(),
            phase: Phase::Analyzing,
            attempts: 1,
            resolved_at: t0 + Duration::milliseconds(9),
            outcome: CallOutcome::Accepted,
        }];
        assert!(art.barriers_hold());

        art.calls[0].resolved_at = t0 + Duration::milliseconds(15);
        assert!(!art.barriers_hold());
    }
}
