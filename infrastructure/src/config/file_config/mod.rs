//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Domain and application types with
//! stable field names (`EvidenceLimits`, `TrustPolicy`, `RateLimitParams`)
//! are deserialized directly; the rest convert through `to_*` methods.

mod chat;
mod engine;
mod issue;
mod network;

pub use chat::FileChatConfig;
pub use engine::{FileConsensusConfig, FileEngineConfig};
pub use issue::{ConfigIssue, Severity};
pub use network::{FileRegistryConfig, FileStoreConfig, FileWebhookConfig};

use roundtable_application::{ChatParams, EngineParams, RateLimitParams, RegistryOptions};
use roundtable_domain::{EvidenceLimits, TrustPolicy};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub consensus: FileConsensusConfig,
    /// Bounds on agent output
    pub evidence: EvidenceLimits,
    /// Trust score update rule
    pub trust: TrustPolicy,
    pub chat: FileChatConfig,
    pub registry: FileRegistryConfig,
    pub webhook: FileWebhookConfig,
    pub rate_limit: RateLimitParams,
    pub store: FileStoreConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.engine.validate());
        issues.extend(self.consensus.validate());
        issues.extend(validate_evidence(&self.evidence));
        issues.extend(validate_trust(&self.trust));
        issues.extend(self.chat.validate());
        issues.extend(self.registry.validate());
        issues.extend(self.webhook.validate());
        issues.extend(validate_rate_limit(&self.rate_limit));
        issues
    }

    pub fn engine_params(&self) -> EngineParams {
        engine::engine_params(&self.engine, &self.consensus)
    }

    pub fn chat_params(&self) -> ChatParams {
        self.chat.to_params()
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            allow_http: self.registry.allow_http,
        }
    }
}

fn validate_evidence(limits: &EvidenceLimits) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if limits.max_payload_bytes == 0 {
        issues.push(ConfigIssue::error("evidence.max_payload_bytes cannot be 0"));
    }
    if limits.max_findings == 0 {
        issues.push(ConfigIssue::error(
            "evidence.max_findings cannot be 0, no analysis could be accepted",
        ));
    }
    if limits.max_claim_chars == 0 || limits.max_text_chars == 0 {
        issues.push(ConfigIssue::error(
            "evidence.max_claim_chars and evidence.max_text_chars cannot be 0",
        ));
    }
    if limits.min_quote_chars == 0 {
        issues.push(ConfigIssue::warning(
            "evidence.min_quote_chars is 0, empty quotes will be accepted",
        ));
    }
    issues
}

fn validate_trust(policy: &TrustPolicy) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if !(policy.learning_rate > 0.0 && policy.learning_rate <= 1.0) {
        issues.push(ConfigIssue::error(format!(
            "trust.learning_rate must be within (0, 1], got {}",
            policy.learning_rate
        )));
    }
    for (field, value) in [
        ("trust.default_score", policy.default_score),
        ("trust.modify_target", policy.modify_target),
    ] {
        if !(0.0..=1.0).contains(&value) {
            issues.push(ConfigIssue::error(format!(
                "{} must be within [0, 1], got {}",
                field, value
            )));
        }
    }
    issues
}

fn validate_rate_limit(params: &RateLimitParams) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if params.requests_per_minute == 0 {
        issues.push(ConfigIssue::error(
            "rate_limit.requests_per_minute cannot be 0",
        ));
    }
    if params.max_tracked_clients == 0 {
        issues.push(ConfigIssue::error(
            "rate_limit.max_tracked_clients cannot be 0",
        ));
    }
    if params.sweep_interval_secs == 0 {
        issues.push(ConfigIssue::error("rate_limit.sweep_interval_secs cannot be 0"));
    }
    issues
}
