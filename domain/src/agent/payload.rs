//! Raw agent payloads
//!
//! Every field is optional so that a partially well-formed answer still
//! deserializes and reaches the evidence enforcer, which decides what is
//! acceptable. Nothing in these types is trusted.

use serde::{Deserialize, Serialize};

/// One finding as an agent reported it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingPayload {
    pub claim: Option<String>,
    /// Verbatim quote from the task input supporting the claim
    pub evidence: Option<String>,
    pub confidence: Option<f64>,
}

impl FindingPayload {
    pub fn new(claim: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            claim: Some(claim.into()),
            evidence: Some(evidence.into()),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Analysis phase answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPayload {
    pub agent_id: Option<String>,
    pub findings: Vec<FindingPayload>,
    /// Free-form risk flags
    pub flags: Vec<String>,
}

impl AnalysisPayload {
    pub fn new(agent_id: impl Into<String>, findings: Vec<FindingPayload>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            findings,
            flags: Vec::new(),
        }
    }
}

/// An objection or concession aimed at another agent's finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeItemPayload {
    /// Finding id, `"<agent>#<index>"`
    pub target: Option<String>,
    pub rationale: Option<String>,
}

impl ChallengeItemPayload {
    pub fn new(target: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            rationale: Some(rationale.into()),
        }
    }
}

/// Challenge phase answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengePayload {
    pub agent_id: Option<String>,
    pub objections: Vec<ChallengeItemPayload>,
    pub concessions: Vec<ChallengeItemPayload>,
}

impl ChallengePayload {
    pub fn empty(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            ..Default::default()
        }
    }
}

/// Voting phase answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotePayload {
    pub agent_id: Option<String>,
    /// `"approve"` or `"dissent"` (a few synonyms are accepted)
    pub decision: Option<String>,
    pub reason: Option<String>,
}

impl VotePayload {
    pub fn new(
        agent_id: impl Into<String>,
        decision: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            decision: Some(decision.into()),
            reason: Some(reason.into()),
        }
    }
}
