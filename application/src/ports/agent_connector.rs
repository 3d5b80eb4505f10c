//! Remote agent connector port
//!
//! Builds an invocation handle for a remote registration that has already
//! passed address checks. Adapters choose the transport from the
//! registration's invocation mode.

use crate::ports::agent::Agent;
use roundtable_domain::RemoteRegistration;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Unsupported invocation mode: {0}")]
    UnsupportedMode(String),

    #[error("Failed to build client: {0}")]
    Client(String),
}

pub trait AgentConnector: Send + Sync {
    fn connect(&self, registration: &RemoteRegistration) -> Result<Arc<dyn Agent>, ConnectError>;
}
