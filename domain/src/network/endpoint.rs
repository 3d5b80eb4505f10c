//! Static checks on a remote agent base URL
//!
//! These run before any DNS lookup. Hostnames still have to be resolved and
//! every resulting address checked with [`super::is_forbidden`]; that part
//! needs I/O and lives in the application layer.

use super::address::classify;
use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

const BLOCKED_HOSTNAMES: &[&str] = &["localhost", "metadata", "metadata.google.internal"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointRejection {
    #[error("Unparseable URL: {0}")]
    Unparseable(String),

    #[error("Scheme '{0}' is not allowed")]
    Scheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("URL must not carry credentials")]
    Credentials,

    #[error("Host '{0}' is blocked")]
    BlockedHostname(String),

    #[error("Address {ip} is {class}")]
    ForbiddenAddress { ip: IpAddr, class: String },
}

/// Host part of a checked endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointHost {
    /// Literal address, already verified
    Ip(IpAddr),
    /// Hostname that still needs resolving
    Domain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedEndpoint {
    pub url: Url,
    pub host: EndpointHost,
    pub port: u16,
}

/// Validate scheme, host and literal addresses of a base URL.
///
/// `https` is always allowed; `http` only when `allow_http` is set.
pub fn check_endpoint_url(raw: &str, allow_http: bool) -> Result<CheckedEndpoint, EndpointRejection> {
    let url = Url::parse(raw.trim()).map_err(|e| EndpointRejection::Unparseable(e.to_string()))?;

    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        other => return Err(EndpointRejection::Scheme(other.to_string())),
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(EndpointRejection::Credentials);
    }

    let port = url.port_or_known_default().unwrap_or(443);

    let host = match url.host() {
        None => return Err(EndpointRejection::MissingHost),
        Some(Host::Ipv4(v4)) => EndpointHost::Ip(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => EndpointHost::Ip(IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            if is_blocked_hostname(&domain) {
                return Err(EndpointRejection::BlockedHostname(domain));
            }
            EndpointHost::Domain(domain)
        }
    };

    if let EndpointHost::Ip(ip) = host {
        check_address(ip)?;
    }

    Ok(CheckedEndpoint { url, host, port })
}

/// Reject an address that is not publicly routable.
pub fn check_address(ip: IpAddr) -> Result<(), EndpointRejection> {
    let class = classify(ip);
    if class == super::AddressClass::Public {
        Ok(())
    } else {
        Err(EndpointRejection::ForbiddenAddress {
            ip,
            class: class.to_string(),
        })
    }
}

fn is_blocked_hostname(host: &str) -> bool {
    BLOCKED_HOSTNAMES.contains(&host) || host.ends_with(".localhost") || host.ends_with(".internal")
}
