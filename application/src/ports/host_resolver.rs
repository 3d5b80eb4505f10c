//! Host resolution port
//!
//! Remote registrations are checked against every address a hostname
//! resolves to, so resolution is an explicit dependency of the registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Host '{0}' did not resolve")]
    NotFound(String),

    #[error("Resolution failed for '{host}': {message}")]
    Failed { host: String, message: String },
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolver backed by a fixed table
///
/// Used for pinned hosts and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticHostResolver {
    table: HashMap<String, Vec<IpAddr>>,
}

impl StaticHostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.table.insert(host.into().to_lowercase(), addrs);
        self
    }
}

#[async_trait]
impl HostResolver for StaticHostResolver {
    async fn resolve(&self, host: &str, _port: u16) -> Result<Vec<IpAddr>, ResolveError> {
        match self.table.get(&host.to_lowercase()) {
            Some(addrs) if !addrs.is_empty() => Ok(addrs.clone()),
            _ => Err(ResolveError::NotFound(host.to_string())),
        }
    }
}
