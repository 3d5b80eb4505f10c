//! Accepted findings
//!
//! A [`Finding`] only exists once the evidence enforcer has verified that its
//! quote appears in the task input.

use crate::core::identity::string_id;
use serde::{Deserialize, Serialize};
use std::fmt;

string_id! {
    /// Finding identifier, `"<agent>#<index>"`
    FindingId
}

impl FindingId {
    pub fn for_agent(agent: &str, index: usize) -> Self {
        Self(format!("{}#{}", agent, index))
    }

    /// Name of the agent that produced the finding.
    pub fn author(&self) -> &str {
        match self.0.rsplit_once('#') {
            Some((agent, _)) => agent,
            None => &self.0,
        }
    }
}

/// Verified quote from the task input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCitation {
    pub quote: String,
    /// Character offset of the quote in the original task input
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: FindingId,
    pub claim: String,
    pub evidence: EvidenceCitation,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// An agent's accepted analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub agent: String,
    pub findings: Vec<Finding>,
    pub flags: Vec<String>,
}

impl AgentAnalysis {
    pub fn finding(&self, id: &FindingId) -> Option<&Finding> {
        self.findings.iter().find(|f| &f.id == id)
    }

    /// Mean confidence over findings, 0.0 when there are none.
    pub fn mean_confidence(&self) -> f64 {
        if self.findings.is_empty() {
            return 0.0;
        }
        self.findings.iter().map(|f| f.confidence).sum::<f64>() / self.findings.len() as f64
    }
}
