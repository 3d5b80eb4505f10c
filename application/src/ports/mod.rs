//! Port definitions (interfaces for external adapters)
//!
//! Ports define the boundaries between the application layer and the
//! outside world. Adapters in the infrastructure layer implement them.

pub mod agent;
pub mod agent_connector;
pub mod artifact_store;
pub mod host_resolver;
pub mod llm_gateway;
pub mod progress;
pub mod strategist;
