//! Round table configuration (`[engine]` and `[consensus]` sections)

use super::issue::ConfigIssue;
use roundtable_application::EngineParams;
use roundtable_domain::ConsensusPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
///
/// # Example
///
/// ```toml
/// [engine]
/// quorum = 2
/// call_timeout_secs = 60
/// strategy_timeout_secs = 30
/// max_concurrency = 8
/// retry_on_invalid = true
/// strategizing = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Minimum agents that must survive every phase
    pub quorum: usize,
    /// Per-call deadline, retries included
    pub call_timeout_secs: u64,
    pub strategy_timeout_secs: u64,
    pub max_concurrency: usize,
    pub retry_on_invalid: bool,
    pub strategizing: bool,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            quorum: params.quorum,
            call_timeout_secs: params.call_timeout.as_secs(),
            strategy_timeout_secs: params.strategy_timeout.as_secs(),
            max_concurrency: params.max_concurrency,
            retry_on_invalid: params.retry_on_invalid,
            strategizing: params.strategizing,
        }
    }
}

impl FileEngineConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.quorum < 1 {
            issues.push(ConfigIssue::error("engine.quorum must be at least 1"));
        }
        if self.call_timeout_secs == 0 {
            issues.push(ConfigIssue::error("engine.call_timeout_secs cannot be 0"));
        }
        if self.strategy_timeout_secs == 0 && self.strategizing {
            issues.push(ConfigIssue::warning(
                "engine.strategy_timeout_secs is 0, every strategizing call will time out",
            ));
        }
        if self.max_concurrency == 0 {
            issues.push(ConfigIssue::error("engine.max_concurrency cannot be 0"));
        }
        issues
    }
}

/// Raw consensus configuration from TOML
///
/// ```toml
/// [consensus]
/// threshold = 0.5
/// undetermined_band = 0.05
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub threshold: f64,
    /// Half-width of the band around the threshold that is left undetermined
    pub undetermined_band: f64,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let policy = ConsensusPolicy::default();
        Self {
            threshold: policy.threshold,
            undetermined_band: policy.undetermined_band,
        }
    }
}

impl FileConsensusConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !(0.0..=1.0).contains(&self.threshold) {
            issues.push(ConfigIssue::error(format!(
                "consensus.threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if !(0.0..0.5).contains(&self.undetermined_band) {
            issues.push(ConfigIssue::error(format!(
                "consensus.undetermined_band must be within [0, 0.5), got {}",
                self.undetermined_band
            )));
        }
        issues
    }

    pub fn to_policy(&self) -> ConsensusPolicy {
        ConsensusPolicy::new(self.threshold, self.undetermined_band)
    }
}

/// Combine `[engine]` and `[consensus]` into engine parameters.
pub fn engine_params(engine: &FileEngineConfig, consensus: &FileConsensusConfig) -> EngineParams {
    let mut params = EngineParams::default()
        .with_quorum(engine.quorum)
        .with_call_timeout(Duration::from_secs(engine.call_timeout_secs))
        .with_max_concurrency(engine.max_concurrency)
        .with_retry_on_invalid(engine.retry_on_invalid)
        .with_strategizing(engine.strategizing)
        .with_consensus(consensus.to_policy());
    params.strategy_timeout = Duration::from_secs(engine.strategy_timeout_secs);
    params
}
