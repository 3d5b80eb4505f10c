//! Vote types for round table consensus

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Dissent,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Dissent => write!(f, "dissent"),
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" | "yes" | "accept" => Ok(Decision::Approve),
            "dissent" | "reject" | "rejected" | "no" => Ok(Decision::Dissent),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

/// A single accepted vote on the synthesis
///
/// # Example
///
/// ```
/// use roundtable_domain::roundtable::Vote;
///
/// let vote = Vote::approve("skeptic", "Findings are corroborated.");
/// assert!(vote.is_approve());
///
/// let vote = Vote::dissent("quality", "Key claim rests on one quote.");
/// assert!(!vote.is_approve());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub agent: String,
    pub decision: Decision,
    pub reason: String,
}

impl Vote {
    pub fn new(agent: impl Into<String>, decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            decision,
            reason: reason.into(),
        }
    }

    pub fn approve(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(agent, Decision::Approve, reason)
    }

    pub fn dissent(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(agent, Decision::Dissent, reason)
    }

    pub fn is_approve(&self) -> bool {
        self.decision == Decision::Approve
    }
}

/// Unweighted count of a set of votes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub approve_count: usize,
    pub dissent_count: usize,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let approve_count = votes.iter().filter(|v| v.is_approve()).count();
        Self {
            approve_count,
            dissent_count: votes.len() - approve_count,
        }
    }

    pub fn participating(&self) -> usize {
        self.approve_count + self.dissent_count
    }

    /// Approvals over participating voters (0.0 to 1.0)
    pub fn approval_rate(&self) -> f64 {
        let total = self.participating();
        if total == 0 {
            0.0
        } else {
            self.approve_count as f64 / total as f64
        }
    }

    pub fn is_unanimous(&self) -> bool {
        self.participating() > 0 && (self.approve_count == 0 || self.dissent_count == 0)
    }

    /// Visual summary, e.g. `"[●●○]"`
    pub fn summary(&self) -> String {
        let mut summary = String::from("[");
        summary.extend(std::iter::repeat_n('●', self.approve_count));
        summary.extend(std::iter::repeat_n('○', self.dissent_count));
        summary.push(']');
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_synonyms() {
        assert_eq!("Approved".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!(" reject ".parse::<Decision>().unwrap(), Decision::Dissent);
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn test_tally() {
        let votes = vec![
            Vote::approve("a", "ok"),
            Vote::approve("b", "ok"),
            Vote::dissent("c", "no"),
        ];
        let tally = VoteTally::from_votes(&votes);
        assert_eq!(tally.approve_count, 2);
        assert_eq!(tally.participating(), 3);
        assert!((tally.approval_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert!(!tally.is_unanimous());
        assert_eq!(tally.summary(), "[●●○]");
    }

    #[test]
    fn test_empty_tally() {
        let tally = VoteTally::from_votes(&[]);
        assert_eq!(tally.approval_rate(), 0.0);
        assert!(!tally.is_unanimous());
    }
}
