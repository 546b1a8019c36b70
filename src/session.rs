use std::future::Future;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use tokio::time::sleep;

use crate::config::ProbeConfig;
use crate::icmp::{IcmpPacket, ProbeRequest, ProbeTransport};
use crate::stats::PingStatistics;

/// Drives the probes of one run and owns its counters.
pub struct ProbeSession<T> {
    transport: T,
    target: Ipv4Addr,
    config: ProbeConfig,
    identifier: u16,
    stats: PingStatistics,
}

impl<T: ProbeTransport> ProbeSession<T> {
    pub fn new(transport: T, target: Ipv4Addr, config: ProbeConfig, identifier: u16) -> Self {
        Self {
            transport,
            target,
            config,
            identifier,
            stats: PingStatistics::new(),
        }
    }

    pub fn build_request(&self, sequence: u16) -> ProbeRequest {
        let packet = IcmpPacket::new_echo_request(self.identifier, sequence, self.config.payload_size);

        ProbeRequest {
            target: self.target,
            packet: packet.to_bytes(),
            identifier: self.identifier,
            sequence,
            timeout: self.config.timeout,
            recv_buffer_size: self.config.recv_buffer_size,
        }
    }

    /// Sends one probe and prints its outcome. Every failure is local to the
    /// probe: it is counted and reported, never propagated.
    pub async fn probe_once<W: Write>(&mut self, sequence: u16, out: &mut W) -> io::Result<()> {
        let request = self.build_request(sequence);
        self.stats.record_sent();

        match self.transport.probe(request).await {
            Ok(response) => {
                log::debug!("Probe seq={} answered in {:.3}ms", response.sequence, response.time_ms);
                self.stats.record_received(response.time_ms);
                writeln!(out, "{}", self.stats.format_response(&response))?;
            }
            Err(e) => {
                log::debug!("Probe seq={} failed: {:?}", sequence, e);
                self.stats.record_failed();
                writeln!(out, "{}", self.stats.format_failure(&e))?;
            }
        }

        Ok(())
    }

    /// Runs until the configured count is exhausted or `shutdown` completes,
    /// then prints the summary. `shutdown` is only observed between probes.
    pub async fn run<W, S>(&mut self, out: &mut W, shutdown: S) -> io::Result<&PingStatistics>
    where
        W: Write,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut sequence: u16 = 1;
        let mut completed: u64 = 0;

        loop {
            if let Some(count) = self.config.count {
                if completed >= count as u64 {
                    break;
                }
            }

            // Don't sleep before the first packet
            if completed > 0 {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        log::info!("Interrupted after {} probes", completed);
                        break;
                    }
                    _ = sleep(self.config.interval) => {}
                }
            }

            self.probe_once(sequence, out).await?;

            completed += 1;
            sequence = sequence.wrapping_add(1);
        }

        writeln!(out, "{}", self.stats.format_summary(&self.target.to_string()))?;
        out.flush()?;

        Ok(&self.stats)
    }
}
