//! Chat parameters: agent selection and escalation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    /// Most agents asked per chat turn (1 to 3).
    pub max_agents: usize,
    /// Fewer responders than this escalates.
    pub min_responders: usize,
    /// Deadline for each agent's answer.
    pub timeout: Duration,
    /// Disagreement above this escalates.
    pub disagreement_threshold: f64,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            max_agents: 3,
            min_responders: 2,
            timeout: Duration::from_secs(15),
            disagreement_threshold: 0.8,
        }
    }
}

impl ChatParams {
    pub fn with_max_agents(mut self, max: usize) -> Self {
        self.max_agents = max.clamp(1, 3);
        self
    }

    pub fn with_min_responders(mut self, min: usize) -> Self {
        self.min_responders = min.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_disagreement_threshold(mut self, threshold: f64) -> Self {
        self.disagreement_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_agents_clamped() {
        assert_eq!(ChatParams::default().with_max_agents(10).max_agents, 3);
        assert_eq!(ChatParams::default().with_max_agents(0).max_agents, 1);
    }
}
