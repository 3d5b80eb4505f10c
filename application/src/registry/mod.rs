//! Agent registry: registration, visibility-filtered lookup and health.

pub mod agent_registry;
pub mod entry;

pub use agent_registry::{AgentRegistry, RegistryError, RegistryOptions};
pub use entry::AgentEntry;
