//! Trust score arithmetic
//!
//! Scores move toward a per-signal target by an exponential moving average
//! and always stay within [0, 1].

use super::signal::FeedbackSignal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustPolicy {
    /// Score for an agent with no feedback yet
    pub default_score: f64,
    /// Fraction of the gap to the target closed per signal
    pub learning_rate: f64,
    /// Target for `modify`, between reject (0) and accept (1)
    pub modify_target: f64,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            default_score: 0.5,
            learning_rate: 0.1,
            modify_target: 0.5,
        }
    }
}

impl TrustPolicy {
    /// Score after applying `signal` to `current`.
    ///
    /// # Example
    ///
    /// ```
    /// use roundtable_domain::trust::{FeedbackSignal, TrustPolicy};
    ///
    /// let policy = TrustPolicy::default();
    /// let next = policy.apply(0.5, FeedbackSignal::Accept);
    /// assert!((next - 0.55).abs() < 1e-9);
    /// ```
    pub fn apply(&self, current: f64, signal: FeedbackSignal) -> f64 {
        let current = if current.is_finite() {
            current.clamp(0.0, 1.0)
        } else {
            self.default_score
        };
        let target = match signal {
            FeedbackSignal::Accept => 1.0,
            FeedbackSignal::Reject => 0.0,
            FeedbackSignal::Modify => self.modify_target,
            FeedbackSignal::Dismiss => return current,
        };
        let rate = if self.learning_rate.is_finite() {
            self.learning_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (current + rate * (target - current)).clamp(0.0, 1.0)
    }
}

/// Per-tenant trust state for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRecord {
    pub score: f64,
    pub accepts: u64,
    pub rejects: u64,
    pub modifies: u64,
    pub dismisses: u64,
    pub updated_at: DateTime<Utc>,
}

impl TrustRecord {
    pub fn new(policy: &TrustPolicy) -> Self {
        Self {
            score: policy.default_score.clamp(0.0, 1.0),
            accepts: 0,
            rejects: 0,
            modifies: 0,
            dismisses: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn record(&mut self, signal: FeedbackSignal, policy: &TrustPolicy) -> f64 {
        self.score = policy.apply(self.score, signal);
        match signal {
            FeedbackSignal::Accept => self.accepts += 1,
            FeedbackSignal::Reject => self.rejects += 1,
            FeedbackSignal::Modify => self.modifies += 1,
            FeedbackSignal::Dismiss => self.dismisses += 1,
        }
        self.updated_at = Utc::now();
        self.score
    }

    pub fn total_signals(&self) -> u64 {
        self.accepts + self.rejects + self.modifies + self.dismisses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_moves_down() {
        let policy = TrustPolicy::default();
        assert!((policy.apply(0.5, FeedbackSignal::Reject) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_dismiss_is_neutral() {
        let policy = TrustPolicy::default();
        assert_eq!(policy.apply(0.7, FeedbackSignal::Dismiss), 0.7);
    }

    #[test]
    fn test_modify_moves_toward_target() {
        let policy = TrustPolicy::default();
        assert!(policy.apply(0.9, FeedbackSignal::Modify) < 0.9);
        assert!(policy.apply(0.2, FeedbackSignal::Modify) > 0.2);
    }

    #[test]
    fn test_repeated_modify_settles_at_midpoint() {
        let policy = TrustPolicy::default();
        for start in [0.9, 0.1] {
            let mut score = start;
            for _ in 0..500 {
                score = policy.apply(score, FeedbackSignal::Modify);
            }
            assert!((score - 0.5).abs() < 1e-9, "from {start}: {score}");
        }
    }

    #[test]
    fn test_scores_stay_bounded() {
        let policy = TrustPolicy {
            learning_rate: 5.0,
            ..Default::default()
        };
        let mut score = 0.5;
        for _ in 0..1000 {
            score = policy.apply(score, FeedbackSignal::Accept);
            assert!((0.0..=1.0).contains(&score));
        }
        for _ in 0..1000 {
            score = policy.apply(score, FeedbackSignal::Reject);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_non_finite_score_resets() {
        let policy = TrustPolicy::default();
        let next = policy.apply(f64::NAN, FeedbackSignal::Dismiss);
        assert_eq!(next, 0.5);
    }

    #[test]
    fn test_record_counts() {
        let policy = TrustPolicy::default();
        let mut record = TrustRecord::new(&policy);
        record.record(FeedbackSignal::Accept, &policy);
        record.record(FeedbackSignal::Dismiss, &policy);
        assert_eq!(record.accepts, 1);
        assert_eq!(record.dismisses, 1);
        assert_eq!(record.total_signals(), 2);
        assert!((record.score - 0.55).abs() < 1e-9);
    }
}
