//! Trust-weighted consensus
//!
//! ```text
//! weighted = Σ trust(approving voters) / Σ trust(all participating voters)
//! ```
//!
//! `weighted > threshold + band` approves, `weighted < threshold - band`
//! rejects, anything in between (or a zero trust total) is undetermined and
//! goes to a human.

use super::vote::{Vote, VoteTally};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusOutcome {
    Approved,
    Rejected,
    /// Inside the band around the threshold, or no trust to weigh by
    Undetermined,
}

impl ConsensusOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, ConsensusOutcome::Approved)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ConsensusOutcome::Rejected)
    }

    pub fn requires_human_review(&self) -> bool {
        matches!(self, ConsensusOutcome::Undetermined)
    }
}

impl fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusOutcome::Approved => write!(f, "Approved"),
            ConsensusOutcome::Rejected => write!(f, "Rejected"),
            ConsensusOutcome::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// Decision boundary for weighted approval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPolicy {
    pub threshold: f64,
    /// Half-width of the undetermined band around the threshold
    pub undetermined_band: f64,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            undetermined_band: 0.0,
        }
    }
}

impl ConsensusPolicy {
    /// Build a policy, clamping both values into [0, 1].
    pub fn new(threshold: f64, undetermined_band: f64) -> Self {
        let clamp = |v: f64, default: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { default };
        Self {
            threshold: clamp(threshold, 0.5),
            undetermined_band: clamp(undetermined_band, 0.0),
        }
    }

    pub fn decide(&self, weighted_approval: Option<f64>) -> ConsensusOutcome {
        let Some(weighted) = weighted_approval else {
            return ConsensusOutcome::Undetermined;
        };
        if weighted > self.threshold + self.undetermined_band {
            ConsensusOutcome::Approved
        } else if weighted < self.threshold - self.undetermined_band {
            ConsensusOutcome::Rejected
        } else {
            // With no band, a value exactly on the threshold is a tie
            ConsensusOutcome::Undetermined
        }
    }
}

/// Trust-weighted approval, or `None` when the trust total is zero.
///
/// Voters missing from `trust` weigh nothing.
pub fn weighted_approval(votes: &[Vote], trust: &HashMap<String, f64>) -> Option<f64> {
    let weight = |v: &Vote| trust.get(&v.agent).copied().unwrap_or(0.0).max(0.0);
    let total: f64 = votes.iter().map(weight).sum();
    if total <= 0.0 {
        return None;
    }
    let approving: f64 = votes.iter().filter(|v| v.is_approve()).map(weight).sum();
    Some(approving / total)
}

/// Everything the artifact records about the vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub outcome: ConsensusOutcome,
    pub tally: VoteTally,
    /// Equals the unweighted approval rate
    pub consensus_rate: f64,
    pub weighted_approval: Option<f64>,
    pub policy: ConsensusPolicy,
}

impl ConsensusReport {
    pub fn compute(votes: &[Vote], trust: &HashMap<String, f64>, policy: ConsensusPolicy) -> Self {
        let tally = VoteTally::from_votes(votes);
        let weighted = weighted_approval(votes, trust);
        Self {
            outcome: policy.decide(weighted),
            consensus_rate: tally.approval_rate(),
            tally,
            weighted_approval: weighted,
            policy,
        }
    }

    pub fn requires_human_review(&self) -> bool {
        self.outcome.requires_human_review()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trust(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_weighted_example() {
        let votes = vec![
            Vote::approve("a", "ok"),
            Vote::approve("b", "ok"),
            Vote::dissent("c", "no"),
        ];
        let report = ConsensusReport::compute(
            &votes,
            &trust(&[("a", 0.8), ("b", 0.6), ("c", 0.5)]),
            ConsensusPolicy::default(),
        );
        let weighted = report.weighted_approval.unwrap();
        assert!((weighted - 1.4 / 1.9).abs() < 1e-9);
        assert_eq!(report.outcome, ConsensusOutcome::Approved);
        assert!((report.consensus_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(!report.requires_human_review());
    }

    #[test]
    fn test_low_trust_majority_can_lose() {
        let votes = vec![
            Vote::approve("a", "ok"),
            Vote::approve("b", "ok"),
            Vote::dissent("c", "no"),
        ];
        let report = ConsensusReport::compute(
            &votes,
            &trust(&[("a", 0.1), ("b", 0.1), ("c", 0.9)]),
            ConsensusPolicy::default(),
        );
        assert_eq!(report.outcome, ConsensusOutcome::Rejected);
        assert!((report.consensus_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_trust_is_undetermined() {
        let votes = vec![Vote::approve("a", "ok")];
        let report =
            ConsensusReport::compute(&votes, &trust(&[("a", 0.0)]), ConsensusPolicy::default());
        assert_eq!(report.weighted_approval, None);
        assert_eq!(report.outcome, ConsensusOutcome::Undetermined);
        assert!(report.requires_human_review());
    }

    #[test]
    fn test_band() {
        let policy = ConsensusPolicy::new(0.5, 0.1);
        assert_eq!(policy.decide(Some(0.65)), ConsensusOutcome::Approved);
        assert_eq!(policy.decide(Some(0.55)), ConsensusOutcome::Undetermined);
        assert_eq!(policy.decide(Some(0.45)), ConsensusOutcome::Undetermined);
        assert_eq!(policy.decide(Some(0.35)), ConsensusOutcome::Rejected);
    }

    #[test]
    fn test_exact_threshold_without_band_is_undetermined() {
        let policy = ConsensusPolicy::default();
        assert_eq!(policy.decide(Some(0.5)), ConsensusOutcome::Undetermined);
        assert_eq!(policy.decide(Some(0.49)), ConsensusOutcome::Rejected);
    }

    #[test]
    fn test_policy_clamps() {
        let policy = ConsensusPolicy::new(1.7, f64::NAN);
        assert_eq!(policy.threshold, 1.0);
        assert_eq!(policy.undetermined_band, 0.0);
    }
}
