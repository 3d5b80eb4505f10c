//! Agent registry
//!
//! Process-wide map of agent name to [`AgentEntry`]. Reads take a short read
//! lock and clone `Arc`s out; writes replace whole entries, so a reader never
//! sees a half-updated agent.

use super::entry::AgentEntry;
use crate::ports::agent::Agent;
use crate::ports::agent_connector::AgentConnector;
use crate::ports::host_resolver::HostResolver;
use futures::future::join_all;
use roundtable_domain::network::{EndpointHost, check_address, check_endpoint_url};
use roundtable_domain::{
    AgentDescriptor, AgentOwner, FailureKind, HealthStatus, IdentityContext, RemoteRegistration,
    Role, Visibility,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

const MAX_NAME_CHARS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registration of {url} rejected: {reason}")]
    SsrfRejected { url: String, reason: String },

    #[error("Agent name '{0}' is already registered by another owner")]
    NameTaken(String),

    #[error("Agent '{0}' not found")]
    NotFound(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Invalid registration: {0}")]
    Invalid(String),

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

impl RegistryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RegistryError::SsrfRejected { .. } => FailureKind::SsrfRejected,
            RegistryError::Unavailable(_) => FailureKind::RegistryOrStorageFailure,
            RegistryError::NameTaken(_)
            | RegistryError::NotFound(_)
            | RegistryError::Forbidden(_)
            | RegistryError::Invalid(_) => FailureKind::InvalidRequest,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Accept `http://` base URLs (development only)
    pub allow_http: bool,
}

pub struct AgentRegistry {
    entries: RwLock<HashMap<String, Arc<AgentEntry>>>,
    resolver: Arc<dyn HostResolver>,
    connector: Option<Arc<dyn AgentConnector>>,
    options: RegistryOptions,
}

impl AgentRegistry {
    pub fn new(resolver: Arc<dyn HostResolver>, options: RegistryOptions) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            resolver,
            connector: None,
            options,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn AgentConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    // ==================== Registration ====================

    /// Register a public, system-owned in-process agent.
    pub fn register_local(&self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        let descriptor = AgentDescriptor::local(agent.name(), agent.domain());
        self.insert(AgentEntry::new(descriptor, agent), Role::Member)
    }

    /// Register an in-process agent owned by `identity`.
    pub fn register_local_scoped(
        &self,
        identity: &IdentityContext,
        agent: Arc<dyn Agent>,
        visibility: Visibility,
        capabilities: Vec<String>,
    ) -> Result<(), RegistryError> {
        require_manager(identity)?;
        let descriptor = AgentDescriptor::local(agent.name(), agent.domain())
            .with_owner(AgentOwner::of(identity))
            .with_visibility(visibility)
            .with_capabilities(capabilities);
        self.insert(AgentEntry::new(descriptor, agent), identity.role)
    }

    /// Register a remote agent after vetting every address its host resolves to.
    pub async fn register_remote(
        &self,
        identity: &IdentityContext,
        mut registration: RemoteRegistration,
    ) -> Result<AgentDescriptor, RegistryError> {
        require_manager(identity)?;
        validate_name(&registration.name)?;
        if registration.domain.trim().is_empty() {
            return Err(RegistryError::Invalid("domain must not be empty".into()));
        }

        self.vet_endpoint(&registration.base_url).await?;

        let connector = self
            .connector
            .as_ref()
            .ok_or_else(|| RegistryError::Unavailable("no remote connector configured".into()))?;

        let owner = AgentOwner::of(identity);
        registration.owner = Some(owner.clone());
        let agent = connector
            .connect(&registration)
            .map_err(|e| RegistryError::Invalid(e.to_string()))?;

        let descriptor = AgentDescriptor::from_registration(&registration, owner);

        self.insert(
            AgentEntry::remote(descriptor.clone(), agent, registration),
            identity.role,
        )?;
        info!(
            agent = %descriptor.name,
            tenant = %identity.tenant_id,
            target = descriptor.target.as_str(),
            "Registered remote agent"
        );
        Ok(descriptor)
    }

    /// Re-register persisted remote agents under their recorded owners.
    ///
    /// Each registration is vetted again. Failures are returned, not fatal.
    pub async fn restore(
        &self,
        registrations: Vec<RemoteRegistration>,
    ) -> Vec<(String, RegistryError)> {
        let mut failures = Vec::new();
        for registration in registrations {
            let name = registration.name.clone();
            let Some(owner) = registration.owner.clone() else {
                failures.push((name, RegistryError::Invalid("registration has no owner".into())));
                continue;
            };
            let identity = IdentityContext::new(
                owner.tenant_id,
                owner.user_id,
                Role::Member,
            );
            if let Err(e) = self.register_remote(&identity, registration).await {
                warn!(agent = %name, error = %e, "Failed to restore remote agent");
                failures.push((name, e));
            }
        }
        failures
    }

    /// Check the scheme and every resolved address of a base URL.
    pub async fn vet_endpoint(&self, base_url: &str) -> Result<(), RegistryError> {
        let reject = |reason: String| RegistryError::SsrfRejected {
            url: base_url.to_string(),
            reason,
        };

        let endpoint =
            check_endpoint_url(base_url, self.options.allow_http).map_err(|e| reject(e.to_string()))?;

        if let EndpointHost::Domain(host) = &endpoint.host {
            let addrs = self
                .resolver
                .resolve(host, endpoint.port)
                .await
                .map_err(|e| reject(e.to_string()))?;
            if addrs.is_empty() {
                return Err(reject(format!("host '{}' did not resolve", host)));
            }
            for ip in addrs {
                check_address(ip).map_err(|e| reject(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Insert or replace an entry. An existing name may only be replaced by
    /// its owner, or by an admin of the owning tenant.
    fn insert(&self, entry: AgentEntry, role: Role) -> Result<(), RegistryError> {
        let mut entries = self.write()?;
        if let Some(existing) = entries.get(entry.name())
            && !may_replace(&existing.descriptor().owner, &entry.descriptor().owner, role)
        {
            return Err(RegistryError::NameTaken(entry.name().to_string()));
        }
        debug!(agent = entry.name(), "Inserting registry entry");
        entries.insert(entry.name().to_string(), Arc::new(entry));
        Ok(())
    }

    /// Remove an agent. Only its owner, or an admin of the owning tenant, may.
    pub fn unregister(
        &self,
        identity: &IdentityContext,
        name: &str,
    ) -> Result<AgentDescriptor, RegistryError> {
        require_manager(identity)?;
        let mut entries = self.write()?;
        let Some(entry) = entries.get(name) else {
            return Err(RegistryError::NotFound(name.to_string()));
        };
        let descriptor = entry.descriptor();
        if !descriptor.is_visible_to(identity) {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        if !may_replace(&descriptor.owner, &AgentOwner::of(identity), identity.role) {
            return Err(RegistryError::Forbidden(format!(
                "agent '{}' belongs to another owner",
                name
            )));
        }
        let removed = entries.remove(name).map(|e| e.descriptor().clone());
        removed.ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    // ==================== Queries ====================

    /// Agents visible to `identity`, sorted by name.
    pub fn list_for_tenant(
        &self,
        identity: &IdentityContext,
    ) -> Result<Vec<AgentDescriptor>, RegistryError> {
        let mut visible: Vec<AgentDescriptor> = self
            .read()?
            .values()
            .filter(|e| e.descriptor().is_visible_to(identity))
            .map(|e| e.descriptor().clone())
            .collect();
        visible.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(visible)
    }

    /// Visible, healthy agents, sorted by name. This is the dispatch snapshot.
    pub fn eligible_for(
        &self,
        identity: &IdentityContext,
    ) -> Result<Vec<Arc<AgentEntry>>, RegistryError> {
        let mut eligible: Vec<Arc<AgentEntry>> = self
            .read()?
            .values()
            .filter(|e| e.descriptor().is_healthy() && e.descriptor().is_visible_to(identity))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(eligible)
    }

    pub fn get(&self, name: &str) -> Result<Option<Arc<AgentEntry>>, RegistryError> {
        Ok(self.read()?.get(name).cloned())
    }

    /// Look up an agent only if `identity` may see it.
    pub fn get_visible(
        &self,
        identity: &IdentityContext,
        name: &str,
    ) -> Result<Arc<AgentEntry>, RegistryError> {
        self.get(name)?
            .filter(|e| e.descriptor().is_visible_to(identity))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn mark_health(&self, name: &str, health: HealthStatus) -> Result<(), RegistryError> {
        let mut entries = self.write()?;
        let Some(entry) = entries.get(name) else {
            return Err(RegistryError::NotFound(name.to_string()));
        };
        if entry.descriptor().health != health {
            let updated = entry.with_descriptor(entry.descriptor().clone().with_health(health));
            entries.insert(name.to_string(), Arc::new(updated));
        }
        Ok(())
    }

    /// Probe every agent and record the result.
    ///
    /// Remote endpoints are re-resolved first; an address that now points
    /// somewhere forbidden marks the agent unhealthy without contacting it.
    pub async fn probe_health(&self) -> Result<Vec<(String, HealthStatus)>, RegistryError> {
        let snapshot: Vec<Arc<AgentEntry>> = self.read()?.values().cloned().collect();

        let probes = snapshot.into_iter().map(|entry| async move {
            let healthy = match entry.descriptor().target.base_url() {
                Some(url) => match self.vet_endpoint(url).await {
                    Ok(()) => entry.agent().health().await,
                    Err(e) => {
                        warn!(agent = entry.name(), error = %e, "Endpoint failed re-validation");
                        false
                    }
                },
                None => entry.agent().health().await,
            };
            let status = if healthy {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            };
            (entry.name().to_string(), status)
        });
        let mut results = join_all(probes).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, status) in &results {
            match self.mark_health(name, *status) {
                Ok(()) | Err(RegistryError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    /// Persisted forms of all remote agents, sorted by name.
    pub fn remote_registrations(&self) -> Result<Vec<RemoteRegistration>, RegistryError> {
        let mut out: Vec<RemoteRegistration> = self
            .read()?
            .values()
            .filter_map(|e| e.registration().cloned())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    pub fn count(&self) -> Result<usize, RegistryError> {
        Ok(self.read()?.len())
    }

    pub fn remote_count(&self) -> Result<usize, RegistryError> {
        Ok(self
            .read()?
            .values()
            .filter(|e| e.descriptor().target.is_remote())
            .count())
    }

    pub fn local_count(&self) -> Result<usize, RegistryError> {
        Ok(self.count()? - self.remote_count()?)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<AgentEntry>>>, RegistryError>
    {
        self.entries
            .read()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<AgentEntry>>>, RegistryError>
    {
        self.entries
            .write()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".into()))
    }
}

fn may_replace(existing: &AgentOwner, caller: &AgentOwner, role: Role) -> bool {
    existing.tenant_id == caller.tenant_id
        && (existing.user_id == caller.user_id || role == Role::Admin)
}

fn require_manager(identity: &IdentityContext) -> Result<(), RegistryError> {
    if identity.role.can_manage_agents() {
        Ok(())
    } else {
        Err(RegistryError::Forbidden(format!(
            "role '{}' cannot manage agents",
            identity.role
        )))
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(RegistryError::Invalid(format!(
            "name must be 1 to {} characters",
            MAX_NAME_CHARS
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(RegistryError::Invalid(format!(
            "name '{}' may only contain letters, digits, '-', '_' and '.'",
            name
        )));
    }
    Ok(())
}
