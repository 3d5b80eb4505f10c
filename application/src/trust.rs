//! Trust tracker
//!
//! Per-(tenant, agent) trust scores. Updates for one key are atomic through
//! the map's entry lock; different keys never contend.

use dashmap::DashMap;
use roundtable_domain::{FeedbackSignal, TenantId, TrustPolicy, TrustRecord};
use std::collections::HashMap;
use tracing::debug;

pub struct TrustTracker {
    records: DashMap<(TenantId, String), TrustRecord>,
    policy: TrustPolicy,
}

impl TrustTracker {
    pub fn new(policy: TrustPolicy) -> Self {
        Self {
            records: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Current score, or the default for an agent with no feedback.
    pub fn score(&self, tenant: &TenantId, agent: &str) -> f64 {
        self.records
            .get(&(tenant.clone(), agent.to_string()))
            .map(|r| r.score)
            .unwrap_or(self.policy.default_score)
    }

    /// Scores for a set of agents, keyed by agent name.
    pub fn scores(&self, tenant: &TenantId, agents: &[String]) -> HashMap<String, f64> {
        agents
            .iter()
            .map(|a| (a.clone(), self.score(tenant, a)))
            .collect()
    }

    /// Apply a feedback signal and return the new score.
    pub fn update(&self, tenant: &TenantId, agent: &str, signal: FeedbackSignal) -> f64 {
        let mut record = self
            .records
            .entry((tenant.clone(), agent.to_string()))
            .or_insert_with(|| TrustRecord::new(&self.policy));
        let score = record.record(signal, &self.policy);
        debug!(tenant = %tenant, agent, signal = %signal, score, "Trust updated");
        score
    }

    pub fn record(&self, tenant: &TenantId, agent: &str) -> Option<TrustRecord> {
        self.records
            .get(&(tenant.clone(), agent.to_string()))
            .map(|r| r.clone())
    }

    /// All records of one tenant, sorted by agent name.
    pub fn snapshot(&self, tenant: &TenantId) -> Vec<(String, TrustRecord)> {
        let mut out: Vec<(String, TrustRecord)> = self
            .records
            .iter()
            .filter(|e| &e.key().0 == tenant)
            .map(|e| (e.key().1.clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Every record across tenants, for persistence.
    pub fn export(&self) -> Vec<(TenantId, String, TrustRecord)> {
        let mut out: Vec<(TenantId, String, TrustRecord)> = self
            .records
            .iter()
            .map(|e| (e.key().0.clone(), e.key().1.clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        out
    }

    /// Load previously exported records. Scores are clamped into [0, 1].
    pub fn import(&self, records: impl IntoIterator<Item = (TenantId, String, TrustRecord)>) {
        for (tenant, agent, mut record) in records {
            if !record.score.is_finite() {
                record.score = self.policy.default_score;
            }
            record.score = record.score.clamp(0.0, 1.0);
            self.records.insert((tenant, agent), record);
        }
    }
}

impl Default for TrustTracker {
    fn default() -> Self {
        Self::new(TrustPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_score() {
        let tracker = TrustTracker::default();
        assert_eq!(tracker.score(&TenantId::new("acme"), "skeptic"), 0.5);
    }

    #[test]
    fn test_scores_are_per_tenant() {
        let tracker = TrustTracker::default();
        let acme = TenantId::new("acme");
        let globex = TenantId::new("globex");
        tracker.update(&acme, "skeptic", FeedbackSignal::Accept);
        assert!(tracker.score(&acme, "skeptic") > 0.5);
        assert_eq!(tracker.score(&globex, "skeptic"), 0.5);
        assert_eq!(tracker.snapshot(&acme).len(), 1);
        assert!(tracker.snapshot(&globex).is_empty());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let tracker = Arc::new(TrustTracker::default());
        let tenant = TenantId::new("acme");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let tenant = tenant.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.update(&tenant, "a", FeedbackSignal::Dismiss);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let record = tracker.record(&tenant, "a").unwrap();
        assert_eq!(record.dismisses, 400);
        assert_eq!(record.score, 0.5);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let tracker = TrustTracker::default();
        let acme = TenantId::new("acme");
        tracker.update(&acme, "skeptic", FeedbackSignal::Accept);
        tracker.update(&TenantId::new("globex"), "skeptic", FeedbackSignal::Reject);

        let restored = TrustTracker::default();
        restored.import(tracker.export());
        assert_eq!(restored.export(), tracker.export());
        assert_eq!(restored.score(&acme, "skeptic"), tracker.score(&acme, "skeptic"));
    }

    #[test]
    fn test_import_clamps_scores() {
        let tracker = TrustTracker::default();
        let acme = TenantId::new("acme");
        let mut record = TrustRecord::new(tracker.policy());
        record.score = 3.0;
        tracker.import([(acme.clone(), "a".to_string(), record)]);
        assert_eq!(tracker.score(&acme, "a"), 1.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let tracker = TrustTracker::default();
        let tenant = TenantId::new("acme");
        for i in 0..500 {
            let signal = if i % 3 == 0 {
                FeedbackSignal::Reject
            } else {
                FeedbackSignal::Accept
            };
            let score = tracker.update(&tenant, "a", signal);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
