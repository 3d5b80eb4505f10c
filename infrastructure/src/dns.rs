//! System DNS host resolver

use async_trait::async_trait;
use roundtable_application::{HostResolver, ResolveError};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

/// Resolves through the operating system via [`tokio::net::lookup_host`]
#[derive(Debug, Clone)]
pub struct DnsHostResolver {
    timeout: Duration,
}

impl Default for DnsHostResolver {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

impl DnsHostResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl HostResolver for DnsHostResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = tokio::net::lookup_host((host, port));
        let addrs = tokio::time::timeout(self.timeout, lookup)
            .await
            .map_err(|_| ResolveError::Failed {
                host: host.to_string(),
                message: format!("lookup timed out after {:?}", self.timeout),
            })?
            .map_err(|e| ResolveError::Failed {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let unique: BTreeSet<IpAddr> = addrs.map(|a| a.ip()).collect();
        if unique.is_empty() {
            return Err(ResolveError::NotFound(host.to_string()));
        }
        Ok(unique.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let resolver = DnsHostResolver::default();
        let addrs = resolver.resolve("127.0.0.1", 443).await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }
}
