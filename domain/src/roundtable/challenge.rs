//! Cross-examination records

use super::finding::FindingId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Objection,
    Concession,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeKind::Objection => write!(f, "objection"),
            ChallengeKind::Concession => write!(f, "concession"),
        }
    }
}

/// An accepted objection or concession against another agent's finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub agent: String,
    pub target: FindingId,
    pub kind: ChallengeKind,
    pub rationale: String,
}

impl Challenge {
    pub fn objection(
        agent: impl Into<String>,
        target: FindingId,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            target,
            kind: ChallengeKind::Objection,
            rationale: rationale.into(),
        }
    }

    pub fn concession(
        agent: impl Into<String>,
        target: FindingId,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            target,
            kind: ChallengeKind::Concession,
            rationale: rationale.into(),
        }
    }

    pub fn is_objection(&self) -> bool {
        self.kind == ChallengeKind::Objection
    }
}
