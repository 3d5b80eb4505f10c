//! Remote agent configuration (`[registry]`, `[webhook]`, `[store]` sections)

use super::issue::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw registry configuration from TOML
///
/// ```toml
/// [registry]
/// allow_http = false
/// persist_path = "/var/lib/roundtable/agents.json"
/// dns_timeout_secs = 5
/// request_timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryConfig {
    /// Accept `http://` endpoints. Address checks still apply.
    pub allow_http: bool,
    /// Where remote registrations are kept; defaults to the data directory
    pub persist_path: Option<PathBuf>,
    pub dns_timeout_secs: u64,
    /// HTTP client timeout for remote agents
    pub request_timeout_secs: u64,
}

impl Default for FileRegistryConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            persist_path: None,
            dns_timeout_secs: 5,
            request_timeout_secs: 60,
        }
    }
}

impl FileRegistryConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.allow_http {
            issues.push(ConfigIssue::warning(
                "registry.allow_http is enabled, agent traffic may travel unencrypted",
            ));
        }
        if self.dns_timeout_secs == 0 {
            issues.push(ConfigIssue::error("registry.dns_timeout_secs cannot be 0"));
        }
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error("registry.request_timeout_secs cannot be 0"));
        }
        issues
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Raw webhook configuration from TOML
///
/// Webhook agents are only enabled when `callback_url` is set and the
/// environment variable named by `secret_env` holds the signing secret.
///
/// ```toml
/// [webhook]
/// callback_url = "https://roundtable.example.com/callbacks"
/// secret_env = "ROUNDTABLE_WEBHOOK_SECRET"
/// tolerance_secs = 300
/// callback_ttl_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWebhookConfig {
    pub callback_url: Option<String>,
    pub secret_env: String,
    /// Accepted timestamp skew, either direction
    pub tolerance_secs: i64,
    /// How long a job may wait for its callback
    pub callback_ttl_secs: u64,
}

impl Default for FileWebhookConfig {
    fn default() -> Self {
        Self {
            callback_url: None,
            secret_env: "ROUNDTABLE_WEBHOOK_SECRET".to_string(),
            tolerance_secs: crate::callback::DEFAULT_TOLERANCE_SECS,
            callback_ttl_secs: 120,
        }
    }
}

impl FileWebhookConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Some(url) = &self.callback_url {
            match url::Url::parse(url) {
                Ok(parsed) if parsed.scheme() != "https" => {
                    issues.push(ConfigIssue::warning(format!(
                        "webhook.callback_url uses {}, callbacks should arrive over https",
                        parsed.scheme()
                    )));
                }
                Ok(_) => {}
                Err(e) => issues.push(ConfigIssue::error(format!(
                    "webhook.callback_url is not a valid URL: {}",
                    e
                ))),
            }
        }
        if self.secret_env.trim().is_empty() {
            issues.push(ConfigIssue::error("webhook.secret_env cannot be empty"));
        }
        if self.tolerance_secs <= 0 {
            issues.push(ConfigIssue::error("webhook.tolerance_secs must be positive"));
        }
        if self.callback_ttl_secs == 0 {
            issues.push(ConfigIssue::error("webhook.callback_ttl_secs cannot be 0"));
        }
        issues
    }

    pub fn callback_ttl(&self) -> Duration {
        Duration::from_secs(self.callback_ttl_secs)
    }

    /// The signing secret, when the named variable is set and non-empty.
    pub fn secret(&self) -> Option<String> {
        std::env::var(&self.secret_env)
            .ok()
            .filter(|s| !s.is_empty())
    }
}

/// Raw store configuration from TOML
///
/// ```toml
/// [store]
/// artifact_dir = "/var/lib/roundtable/artifacts"
/// trust_path = "/var/lib/roundtable/trust.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// Artifact directory; defaults to the data directory
    pub artifact_dir: Option<PathBuf>,
    /// Trust score file; defaults to the data directory
    pub trust_path: Option<PathBuf>,
}
