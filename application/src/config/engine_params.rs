//! Engine parameters: round table dispatch control.

use roundtable_domain::ConsensusPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatch and decision parameters for
/// [`RoundTableEngine`](crate::use_cases::run_round_table::RoundTableEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Minimum agents that must survive every phase.
    pub quorum: usize,
    /// Deadline for a single agent call, retries included.
    pub call_timeout: Duration,
    /// Deadline for the strategist.
    pub strategy_timeout: Duration,
    /// Upper bound on concurrent agent calls per phase.
    pub max_concurrency: usize,
    /// Re-ask an agent once when its output fails validation.
    pub retry_on_invalid: bool,
    /// Run the strategizing phase when a strategist is configured.
    pub strategizing: bool,
    pub consensus: ConsensusPolicy,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            quorum: 2,
            call_timeout: Duration::from_secs(60),
            strategy_timeout: Duration::from_secs(30),
            max_concurrency: 8,
            retry_on_invalid: true,
            strategizing: true,
            consensus: ConsensusPolicy::default(),
        }
    }
}

impl EngineParams {
    // ==================== Builder Methods ====================

    pub fn with_quorum(mut self, quorum: usize) -> Self {
        self.quorum = quorum.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_retry_on_invalid(mut self, retry: bool) -> Self {
        self.retry_on_invalid = retry;
        self
    }

    pub fn with_strategizing(mut self, enabled: bool) -> Self {
        self.strategizing = enabled;
        self
    }

    pub fn with_consensus(mut self, consensus: ConsensusPolicy) -> Self {
        self.consensus = consensus;
        self
    }

    /// Attempts per agent call: one, or two with retry enabled.
    pub fn max_attempts(&self) -> u8 {
        if self.retry_on_invalid { 2 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = EngineParams::default();
        assert_eq!(params.quorum, 2);
        assert_eq!(params.call_timeout, Duration::from_secs(60));
        assert_eq!(params.max_attempts(), 2);
        assert_eq!(params.consensus.threshold, 0.5);
    }

    #[test]
    fn test_builder_floors() {
        let params = EngineParams::default()
            .with_quorum(0)
            .with_max_concurrency(0)
            .with_retry_on_invalid(false);
        assert_eq!(params.quorum, 1);
        assert_eq!(params.max_concurrency, 1);
        assert_eq!(params.max_attempts(), 1);
    }
}
