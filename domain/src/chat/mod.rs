//! Lightweight chat with escalation
//!
//! A chat answer comes from a handful of the most relevant agents. When they
//! disagree, or too few answer, the response asks for a full round table.

use crate::core::text::jaccard;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EscalationReason {
    NoRelevantAgents,
    InsufficientResponders { responded: usize, required: usize },
    Disagreement { score: f64, threshold: f64 },
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationReason::NoRelevantAgents => write!(f, "no relevant agents are available"),
            EscalationReason::InsufficientResponders {
                responded,
                required,
            } => write!(f, "only {} of {} required agents answered", responded, required),
            EscalationReason::Disagreement { score, threshold } => write!(
                f,
                "agents disagree (score {:.2} above {:.2})",
                score, threshold
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub escalate: bool,
    pub escalation_reason: Option<EscalationReason>,
    pub responders: Vec<String>,
    pub degraded: Vec<String>,
    pub disagreement: f64,
}

/// One minus the mean pairwise Jaccard similarity of the responders' claim
/// tokens. Fewer than two responders cannot disagree.
pub fn disagreement(responses: &[BTreeSet<String>]) -> f64 {
    if responses.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in responses.iter().enumerate() {
        for b in &responses[i + 1..] {
            total += jaccard(a, b);
            pairs += 1;
        }
    }
    1.0 - total / pairs as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::tokenize;

    #[test]
    fn test_single_responder_never_disagrees() {
        assert_eq!(disagreement(&[tokenize("anything at all")]), 0.0);
    }

    #[test]
    fn test_identical_answers_agree() {
        let a = tokenize("contract renewal requires notice");
        assert_eq!(disagreement(&[a.clone(), a]), 0.0);
    }

    #[test]
    fn test_disjoint_answers_disagree() {
        let score = disagreement(&[tokenize("revenue grew"), tokenize("costs exploded")]);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_escalation_reason_display() {
        let reason = EscalationReason::InsufficientResponders {
            responded: 1,
            required: 2,
        };
        assert_eq!(reason.to_string(), "only 1 of 2 required agents answered");
    }
}
