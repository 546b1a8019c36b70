use std::time::Duration;

use crate::icmp::ICMP_HEADER_LEN;

pub const DEFAULT_TIMEOUT_MS: u32 = 1500;
pub const DEFAULT_COUNT: u32 = 4;
pub const DEFAULT_PAYLOAD_SIZE: usize = 32;
pub const DEFAULT_INTERVAL_MS: u64 = 2000;
pub const MAX_PAYLOAD_SIZE: usize = 65500;

const IPV4_MAX_HEADER_LEN: usize = 60;
const IPV4_MIN_HEADER_LEN: usize = 20;

/// Smallest receive buffer that still holds an IPv4 header and an ICMP header.
pub const MIN_RECV_BUFFER_SIZE: usize = IPV4_MIN_HEADER_LEN + ICMP_HEADER_LEN;

/// Largest IPv4 datagram; no reply can fill more than this.
pub const MAX_RECV_BUFFER_SIZE: usize = 65535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub target: String,
    pub timeout: Duration,
    /// `None` runs until interrupted.
    pub count: Option<u32>,
    pub payload_size: usize,
    pub recv_buffer_size: usize,
    pub interval: Duration,
    pub continuous: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS as u64),
            count: Some(DEFAULT_COUNT),
            payload_size: DEFAULT_PAYLOAD_SIZE,
            recv_buffer_size: recv_buffer_for(DEFAULT_PAYLOAD_SIZE),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            continuous: false,
        }
    }
}

/// Receive buffer that fits a reply echoing `payload_size` bytes behind an
/// IPv4 header carrying the maximum amount of options, capped at the largest
/// IPv4 datagram.
pub fn recv_buffer_for(payload_size: usize) -> usize {
    (IPV4_MAX_HEADER_LEN + ICMP_HEADER_LEN)
        .saturating_add(payload_size)
        .min(MAX_RECV_BUFFER_SIZE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    PayloadTooLarge(usize),
    ZeroCount,
    ZeroTimeout,
    RecvBufferTooSmall(usize),
    RecvBufferTooLarge(usize),
    EmptyTarget,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::PayloadTooLarge(size) => write!(
                f,
                "payload size {} is too large, the maximum is {} bytes",
                size, MAX_PAYLOAD_SIZE
            ),
            ConfigError::ZeroCount => write!(f, "count must be greater than 0"),
            ConfigError::ZeroTimeout => write!(f, "timeout must be greater than 0"),
            ConfigError::RecvBufferTooSmall(size) => write!(
                f,
                "receive buffer of {} bytes is too small, the minimum is {} bytes",
                size, MIN_RECV_BUFFER_SIZE
            ),
            ConfigError::RecvBufferTooLarge(size) => write!(
                f,
                "receive buffer of {} bytes is too large, the maximum is {} bytes",
                size, MAX_RECV_BUFFER_SIZE
            ),
            ConfigError::EmptyTarget => write!(f, "a target host is required"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }

        if self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(ConfigError::PayloadTooLarge(self.payload_size));
        }

        if self.count == Some(0) {
            return Err(ConfigError::ZeroCount);
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.recv_buffer_size < MIN_RECV_BUFFER_SIZE {
            return Err(ConfigError::RecvBufferTooSmall(self.recv_buffer_size));
        }

        if self.recv_buffer_size > MAX_RECV_BUFFER_SIZE {
            return Err(ConfigError::RecvBufferTooLarge(self.recv_buffer_size));
        }

        Ok(())
    }

    /// Total size of one Echo Request on the wire, without the IP header.
    pub fn packet_size(&self) -> usize {
        ICMP_HEADER_LEN + self.payload_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target: &str) -> ProbeConfig {
        ProbeConfig {
            target: target.to_string(),
            ..ProbeConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.count, Some(4));
        assert_eq!(config.payload_size, 32);
        assert_eq!(config.recv_buffer_size, 100);
        assert_eq!(config.interval, Duration::from_secs(2));
        assert!(!config.continuous);
        assert_eq!(config.packet_size(), 40);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(config("127.0.0.1").validate().is_ok());
        assert_eq!(config("").validate(), Err(ConfigError::EmptyTarget));

        let mut big = config("127.0.0.1");
        big.payload_size = 70000;
        assert_eq!(big.validate(), Err(ConfigError::PayloadTooLarge(70000)));

        let mut zero = config("127.0.0.1");
        zero.count = Some(0);
        assert_eq!(zero.validate(), Err(ConfigError::ZeroCount));

        let mut unbounded = config("127.0.0.1");
        unbounded.count = None;
        assert!(unbounded.validate().is_ok());

        let mut no_wait = config("127.0.0.1");
        no_wait.timeout = Duration::ZERO;
        assert_eq!(no_wait.validate(), Err(ConfigError::ZeroTimeout));

        let mut tiny = config("127.0.0.1");
        tiny.recv_buffer_size = 27;
        assert_eq!(tiny.validate(), Err(ConfigError::RecvBufferTooSmall(27)));
    }

    #[test]
    fn test_recv_buffer_upper_bound() {
        let mut largest = config("127.0.0.1");
        largest.recv_buffer_size = MAX_RECV_BUFFER_SIZE;
        assert!(largest.validate().is_ok());

        let mut huge = config("127.0.0.1");
        huge.recv_buffer_size = MAX_RECV_BUFFER_SIZE + 1;
        assert_eq!(huge.validate(), Err(ConfigError::RecvBufferTooLarge(65536)));

        huge.recv_buffer_size = usize::MAX;
        assert_eq!(huge.validate(), Err(ConfigError::RecvBufferTooLarge(usize::MAX)));
    }

    #[test]
    fn test_default_buffer_fits_largest_payload() {
        let mut largest = config("127.0.0.1");
        largest.payload_size = MAX_PAYLOAD_SIZE;
        largest.recv_buffer_size = recv_buffer_for(MAX_PAYLOAD_SIZE);
        assert_eq!(largest.recv_buffer_size, MAX_RECV_BUFFER_SIZE);
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_header_only_payload_is_valid() {
        let mut header_only = config("127.0.0.1");
        header_only.payload_size = 0;
        assert!(header_only.validate().is_ok());
        assert_eq!(header_only.packet_size(), ICMP_HEADER_LEN);
    }
}
