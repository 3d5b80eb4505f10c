//! Chat configuration (`[chat]` section)

use super::issue::ConfigIssue;
use roundtable_application::ChatParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw chat configuration from TOML
///
/// ```toml
/// [chat]
/// max_agents = 3
/// min_responders = 2
/// timeout_secs = 15
/// disagreement_threshold = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub max_agents: usize,
    pub min_responders: usize,
    pub timeout_secs: u64,
    pub disagreement_threshold: f64,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        let params = ChatParams::default();
        Self {
            max_agents: params.max_agents,
            min_responders: params.min_responders,
            timeout_secs: params.timeout.as_secs(),
            disagreement_threshold: params.disagreement_threshold,
        }
    }
}

impl FileChatConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !(1..=3).contains(&self.max_agents) {
            issues.push(ConfigIssue::warning(format!(
                "chat.max_agents is {}, clamped into 1..=3",
                self.max_agents
            )));
        }
        if self.min_responders > self.max_agents.clamp(1, 3) {
            issues.push(ConfigIssue::error(format!(
                "chat.min_responders ({}) exceeds chat.max_agents, every chat would escalate",
                self.min_responders
            )));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error("chat.timeout_secs cannot be 0"));
        }
        if !(0.0..=1.0).contains(&self.disagreement_threshold) {
            issues.push(ConfigIssue::error(format!(
                "chat.disagreement_threshold must be within [0, 1], got {}",
                self.disagreement_threshold
            )));
        }
        issues
    }

    pub fn to_params(&self) -> ChatParams {
        ChatParams::default()
            .with_max_agents(self.max_agents)
            .with_min_responders(self.min_responders)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_disagreement_threshold(self.disagreement_threshold)
    }
}
