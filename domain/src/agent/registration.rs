//! Remote agent registration request
//!
//! Also the persisted form of a remote agent: the registry exports these so
//! registrations survive a restart. Secrets are never part of it; API keys
//! are looked up from the environment at connect time.

use super::descriptor::{AgentOwner, InvocationTarget};
use super::visibility::Visibility;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a remote agent answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// Answer in the HTTP response
    #[default]
    Sync,
    /// Acknowledge, then deliver the answer to a signed callback
    Webhook,
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationMode::Sync => write!(f, "sync"),
            InvocationMode::Webhook => write!(f, "webhook"),
        }
    }
}

impl FromStr for InvocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" | "http" => Ok(InvocationMode::Sync),
            "webhook" | "callback" => Ok(InvocationMode::Webhook),
            other => Err(format!("unknown invocation mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRegistration {
    pub name: String,
    pub domain: String,
    pub base_url: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub mode: InvocationMode,
    /// Filled in by the registry from the registering identity
    pub owner: Option<AgentOwner>,
}

impl RemoteRegistration {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            base_url: base_url.into(),
            capabilities: Vec::new(),
            visibility: Visibility::Public,
            mode: InvocationMode::Sync,
            owner: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn target(&self) -> InvocationTarget {
        match self.mode {
            InvocationMode::Sync => InvocationTarget::RemoteHttp {
                base_url: self.base_url.clone(),
            },
            InvocationMode::Webhook => InvocationTarget::Webhook {
                base_url: self.base_url.clone(),
            },
        }
    }

    /// Environment variable holding this agent's API key,
    /// e.g. `AGENT_LEGAL_REVIEW_API_KEY` for `legal-review`.
    pub fn api_key_env(&self) -> String {
        let upper: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("AGENT_{}_API_KEY", upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_env() {
        let r = RemoteRegistration::new("legal-review", "law", "https://x.example.com");
        assert_eq!(r.api_key_env(), "AGENT_LEGAL_REVIEW_API_KEY");
    }

    #[test]
    fn test_target_follows_mode() {
        let r = RemoteRegistration::new("a", "b", "https://x.example.com")
            .with_mode(InvocationMode::Webhook);
        assert!(matches!(r.target(), InvocationTarget::Webhook { .. }));
    }

    #[test]
    fn test_defaults_when_deserializing() {
        let r: RemoteRegistration = serde_json::from_str(
            r#"{"name": "a", "domain": "b", "base_url": "https://x.example.com", "owner": null}"#,
        )
        .unwrap();
        assert_eq!(r.mode, InvocationMode::Sync);
        assert_eq!(r.visibility, Visibility::Public);
    }
}
