use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use crate::icmp::{IcmpResponse, ProbeError, ProbeRequest, ProbeTransport, parse_datagram};

/// Opens a fresh raw ICMP socket for every probe and closes it when the
/// probe's outcome is known.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawSocketTransport;

impl RawSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl ProbeTransport for RawSocketTransport {
    async fn probe(&self, request: ProbeRequest) -> Result<IcmpResponse, ProbeError> {
        tokio::task::spawn_blocking(move || probe_blocking(&request))
            .await
            .map_err(|e| ProbeError::Read(io::Error::other(e)))?
    }
}

fn open_raw_socket() -> io::Result<Socket> {
    Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
}

fn connect(target: Ipv4Addr) -> io::Result<Socket> {
    let socket = open_raw_socket()?;
    socket.set_nonblocking(false)?;
    socket.connect(&SocketAddr::new(IpAddr::V4(target), 0).into())?;
    Ok(socket)
}

/// Read timeout left before `deadline`, or `None` once it has passed.
/// SO_RCVTIMEO has microsecond granularity and treats zero as "wait forever",
/// so anything below one microsecond counts as expired.
pub fn read_timeout_for(deadline: Instant, now: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(now);
    if remaining < Duration::from_micros(1) {
        None
    } else {
        Some(remaining)
    }
}

/// One full send/receive cycle on the calling thread. The socket is dropped
/// on every return path.
pub fn probe_blocking(request: &ProbeRequest) -> Result<IcmpResponse, ProbeError> {
    let socket = connect(request.target).map_err(ProbeError::Connect)?;
    log::debug!("Raw ICMP socket connected to {}", request.target);

    let written = socket.send(&request.packet).map_err(ProbeError::Write)?;
    if written != request.packet.len() {
        return Err(ProbeError::Write(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {} of {} bytes", written, request.packet.len()),
        )));
    }
    log::debug!(
        "Sent echo request seq={} to {}: {} bytes",
        request.sequence,
        request.target,
        written
    );

    let start = Instant::now();
    let deadline = start + request.timeout;
    let mut buffer = vec![0u8; request.recv_buffer_size];

    loop {
        let Some(remaining) = read_timeout_for(deadline, Instant::now()) else {
            return Err(ProbeError::Timeout);
        };
        socket.set_read_timeout(Some(remaining)).map_err(ProbeError::Read)?;

        let received = match (&socket).read(&mut buffer) {
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => return Err(ProbeError::Read(e)),
        };
        let elapsed = start.elapsed();

        match parse_datagram(&buffer[..received]) {
            Some(datagram) if datagram.packet.matches(request.identifier, request.sequence) => {
                log::debug!("Echo reply seq={} after {:?}", request.sequence, elapsed);
                if !datagram.packet.verify_checksum() {
                    // Truncated by a small receive buffer, or corrupted
                    log::debug!("Echo reply seq={} fails checksum verification", request.sequence);
                }
                return Ok(IcmpResponse {
                    source: request.target,
                    bytes: datagram.packet.payload.len() as u32,
                    time_ms: elapsed.as_secs_f64() * 1000.0,
                    ttl: datagram.ttl,
                    sequence: request.sequence,
                });
            }
            Some(datagram) => {
                log::debug!(
                    "Skipping ICMP type={} id={} seq={}",
                    datagram.packet.icmp_type,
                    datagram.packet.identifier,
                    datagram.packet.sequence
                );
            }
            None => log::debug!("Skipping unparsable datagram of {} bytes", received),
        }
    }
}

// Helper function to check if raw socket privileges are available
pub fn check_raw_socket_privileges() -> bool {
    open_raw_socket().is_ok()
}
