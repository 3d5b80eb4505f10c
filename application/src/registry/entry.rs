//! Registry entry: descriptor plus invocation handle

use crate::ports::agent::Agent;
use roundtable_domain::{AgentDescriptor, RemoteRegistration};
use std::fmt;
use std::sync::Arc;

/// A registered agent
///
/// Entries are immutable; health changes replace the entry.
#[derive(Clone)]
pub struct AgentEntry {
    descriptor: AgentDescriptor,
    agent: Arc<dyn Agent>,
    registration: Option<RemoteRegistration>,
}

impl AgentEntry {
    pub fn new(descriptor: AgentDescriptor, agent: Arc<dyn Agent>) -> Self {
        Self {
            descriptor,
            agent,
            registration: None,
        }
    }

    pub fn remote(
        descriptor: AgentDescriptor,
        agent: Arc<dyn Agent>,
        registration: RemoteRegistration,
    ) -> Self {
        Self {
            descriptor,
            agent,
            registration: Some(registration),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn agent(&self) -> Arc<dyn Agent> {
        Arc::clone(&self.agent)
    }

    /// The persisted form of a remote agent, `None` for in-process agents.
    pub fn registration(&self) -> Option<&RemoteRegistration> {
        self.registration.as_ref()
    }

    pub(crate) fn with_descriptor(&self, descriptor: AgentDescriptor) -> Self {
        Self {
            descriptor,
            agent: Arc::clone(&self.agent),
            registration: self.registration.clone(),
        }
    }
}

impl fmt::Debug for AgentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentEntry")
            .field("descriptor", &self.descriptor)
            .field("remote", &self.registration.is_some())
            .finish()
    }
}
