pub mod packet;
pub mod socket;

pub use packet::*;
pub use socket::*;

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IcmpResponse {
    pub source: Ipv4Addr,
    pub bytes: u32,
    pub time_ms: f64,
    pub ttl: Option<u8>,
    pub sequence: u16,
}

/// Everything one probe needs. The packet is already built and checksummed.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub target: Ipv4Addr,
    pub packet: Vec<u8>,
    pub identifier: u16,
    pub sequence: u16,
    pub timeout: Duration,
    pub recv_buffer_size: usize,
}

#[derive(Debug)]
pub enum ProbeError {
    Connect(io::Error),
    Write(io::Error),
    Timeout,
    Read(io::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Connect(e) => write!(f, "Cannot reach remote host: {}", e),
            ProbeError::Write(e) => write!(f, "Failed to send echo request: {}", e),
            ProbeError::Timeout => write!(f, "Request timed out"),
            ProbeError::Read(e) => write!(f, "Failed to read echo reply: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Connect(e) | ProbeError::Write(e) | ProbeError::Read(e) => Some(e),
            ProbeError::Timeout => None,
        }
    }
}

/// Sends one echo request and waits for its reply.
///
/// Implementations own the whole socket lifecycle of a probe: nothing is
/// carried over from one call to the next.
pub trait ProbeTransport {
    async fn probe(&self, request: ProbeRequest) -> Result<IcmpResponse, ProbeError>;
}
