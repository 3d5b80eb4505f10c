//! Agent descriptor entity

use super::registration::RemoteRegistration;
use super::visibility::{Visibility, is_visible};
use crate::core::identity::{IdentityContext, TenantId, UserId};
use crate::core::text::tokenize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tenant and user that registered an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentOwner {
    pub tenant_id: TenantId,
    pub user_id: UserId,
}

impl AgentOwner {
    pub fn new(tenant_id: impl Into<TenantId>, user_id: impl Into<UserId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn of(identity: &IdentityContext) -> Self {
        Self {
            tenant_id: identity.tenant_id.clone(),
            user_id: identity.user_id.clone(),
        }
    }
}

/// How an agent is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvocationTarget {
    /// Runs inside this process
    InProcess,
    /// Synchronous HTTP endpoint
    RemoteHttp { base_url: String },
    /// Accepts work over HTTP and answers through a signed callback
    Webhook { base_url: String },
}

impl InvocationTarget {
    pub fn base_url(&self) -> Option<&str> {
        match self {
            InvocationTarget::InProcess => None,
            InvocationTarget::RemoteHttp { base_url } | InvocationTarget::Webhook { base_url } => {
                Some(base_url)
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, InvocationTarget::InProcess)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InvocationTarget::InProcess => "local",
            InvocationTarget::RemoteHttp { .. } => "remote",
            InvocationTarget::Webhook { .. } => "webhook",
        }
    }
}

/// Last known health of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Everything the registry knows about an agent apart from its handle
///
/// Names are globally unique across tenants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    /// Short description of the agent's expertise, used for relevance
    pub domain: String,
    pub capabilities: Vec<String>,
    pub target: InvocationTarget,
    pub visibility: Visibility,
    pub owner: AgentOwner,
    pub health: HealthStatus,
    pub registered_at: DateTime<Utc>,
}

impl AgentDescriptor {
    /// Descriptor of an in-process agent owned by the system tenant.
    pub fn local(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            capabilities: Vec::new(),
            target: InvocationTarget::InProcess,
            visibility: Visibility::Public,
            owner: AgentOwner::of(&IdentityContext::system()),
            health: HealthStatus::Healthy,
            registered_at: Utc::now(),
        }
    }

    /// Descriptor of a vetted remote registration.
    pub fn from_registration(registration: &RemoteRegistration, owner: AgentOwner) -> Self {
        Self {
            name: registration.name.clone(),
            domain: registration.domain.clone(),
            capabilities: registration.capabilities.clone(),
            target: registration.target(),
            visibility: registration.visibility,
            owner,
            health: HealthStatus::Healthy,
            registered_at: Utc::now(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_owner(mut self, owner: AgentOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_target(mut self, target: InvocationTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.health == HealthStatus::Healthy
    }

    pub fn is_visible_to(&self, requester: &IdentityContext) -> bool {
        is_visible(self.visibility, &self.owner, requester)
    }

    /// Relevance tokens: domain words plus capability words.
    pub fn tags(&self) -> BTreeSet<String> {
        let mut tags = tokenize(&self.domain);
        for capability in &self.capabilities {
            tags.extend(tokenize(capability));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_descriptor_defaults() {
        let d = AgentDescriptor::local("skeptic", "adversarial review");
        assert_eq!(d.target, InvocationTarget::InProcess);
        assert_eq!(d.visibility, Visibility::Public);
        assert_eq!(d.owner.tenant_id, TenantId::system());
        assert!(d.is_healthy());
    }

    #[test]
    fn test_tags_merge_domain_and_capabilities() {
        let d = AgentDescriptor::local("fin", "financial statements")
            .with_capabilities(vec!["revenue-analysis".into()]);
        let tags = d.tags();
        assert!(tags.contains("financial"));
        assert!(tags.contains("revenue"));
        assert!(tags.contains("analysis"));
    }

    #[test]
    fn test_target_serialization() {
        let target = InvocationTarget::Webhook {
            base_url: "https://agent.example.com".into(),
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "webhook");
        assert_eq!(target.base_url(), Some("https://agent.example.com"));
        assert!(target.is_remote());
    }

    #[test]
    fn test_private_descriptor_visibility() {
        let d = AgentDescriptor::local("mine", "notes")
            .with_owner(AgentOwner::new("acme", "alice"))
            .with_visibility(Visibility::Private);
        assert!(d.is_visible_to(&IdentityContext::new(
            "acme",
            "alice",
            crate::core::identity::Role::Member
        )));
        assert!(!d.is_visible_to(&IdentityContext::new(
            "acme",
            "bob",
            crate::core::identity::Role::Member
        )));
    }
}
