use dns_lookup::lookup_host;
use std::io;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug)]
pub enum ResolveError {
    InvalidTarget(String),
    Ipv6NotSupported(String),
    Lookup { host: String, source: io::Error },
    NoIpv4Address(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::InvalidTarget(host) => write!(f, "'{}' is not a valid host name", host),
            ResolveError::Ipv6NotSupported(host) => write!(f, "IPv6 target '{}' is not supported", host),
            ResolveError::Lookup { host, source } => write!(f, "lookup of '{}' failed: {}", host, source),
            ResolveError::NoIpv4Address(host) => write!(f, "no IPv4 address found for '{}'", host),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Lookup { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolves the target once, before any socket is opened.
pub async fn resolve_target(hostname: &str) -> Result<Ipv4Addr, ResolveError> {
    // First try to parse as IP address
    match hostname.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => return Ok(ip),
        Ok(IpAddr::V6(_)) => return Err(ResolveError::Ipv6NotSupported(hostname.to_string())),
        Err(_) => {}
    }

    if hostname.is_empty() || hostname.chars().any(char::is_whitespace) {
        return Err(ResolveError::InvalidTarget(hostname.to_string()));
    }

    // Perform DNS lookup
    let addresses = tokio::task::spawn_blocking({
        let hostname = hostname.to_string();
        move || lookup_host(&hostname)
    })
    .await
    .map_err(|e| ResolveError::Lookup {
        host: hostname.to_string(),
        source: io::Error::other(e),
    })?
    .map_err(|source| ResolveError::Lookup {
        host: hostname.to_string(),
        source: io::Error::from(source),
    })?;

    log::debug!("{} resolved to {:?}", hostname, addresses);

    addresses
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| ResolveError::NoIpv4Address(hostname.to_string()))
}
