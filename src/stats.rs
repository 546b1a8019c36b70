use std::net::Ipv4Addr;

use crate::icmp::{IcmpResponse, ProbeError};
use crate::utils::format_time;

/// Run-wide counters. `received + failed == sent` once every sent probe has
/// an outcome.
#[derive(Debug, Clone)]
pub struct PingStatistics {
    pub packets_sent: u32,
    pub packets_received: u32,
    pub packets_failed: u32,
    pub min_time: f64,
    pub max_time: f64,
    pub total_time: f64,
}

impl PingStatistics {
    pub fn new() -> Self {
        Self {
            packets_sent: 0,
            packets_received: 0,
            packets_failed: 0,
            min_time: f64::INFINITY,
            max_time: 0.0,
            total_time: 0.0,
        }
    }

    pub fn record_sent(&mut self) {
        self.packets_sent += 1;
    }

    pub fn record_received(&mut self, time_ms: f64) {
        self.packets_received += 1;
        self.total_time += time_ms;

        if time_ms < self.min_time {
            self.min_time = time_ms;
        }

        if time_ms > self.max_time {
            self.max_time = time_ms;
        }
    }

    pub fn record_failed(&mut self) {
        self.packets_failed += 1;
    }

    pub fn loss_percentage(&self) -> f64 {
        if self.packets_sent == 0 {
            return 0.0;
        }
        100.0 * self.packets_failed as f64 / self.packets_sent as f64
    }

    pub fn average_time(&self) -> f64 {
        if self.packets_received == 0 {
            return 0.0;
        }
        self.total_time / self.packets_received as f64
    }

    pub fn format_summary(&self, target: &str) -> String {
        let mut summary = format!(
            "\n{} 的 Ping 统计信息:\n    数据包: 已发送 = {}, 已接收 = {}, 丢失 = {} ({:.1}% 丢失),\n",
            target,
            self.packets_sent,
            self.packets_received,
            self.packets_failed,
            self.loss_percentage()
        );

        if self.packets_received > 0 {
            summary.push_str(&format!(
                "往返行程的估计时间(以毫秒为单位):\n    最短 = {}，最长 = {}，平均 = {}\n",
                format_time(self.min_time),
                format_time(self.max_time),
                format_time(self.average_time())
            ));
        }

        summary
    }

    pub fn format_response(&self, response: &IcmpResponse) -> String {
        let mut line = format!(
            "来自 {} 的回复: 字节={} 时间={}",
            response.source,
            response.bytes,
            format_time(response.time_ms)
        );

        if let Some(ttl) = response.ttl {
            line.push_str(&format!(" TTL={}", ttl));
        }

        line
    }

    pub fn format_failure(&self, error: &ProbeError) -> String {
        match error {
            ProbeError::Timeout => "请求超时。".to_string(),
            other => format!("错误: {}", other),
        }
    }

    /// `payload_size` excludes the ICMP and IP headers.
    pub fn format_header(&self, target: &str, resolved_ip: &Ipv4Addr, payload_size: usize) -> String {
        if target == resolved_ip.to_string() {
            format!("正在 Ping {} 具有 {} 字节的数据:", target, payload_size)
        } else {
            format!("正在 Ping {} [{}] 具有 {} 字节的数据:", target, resolved_ip, payload_size)
        }
    }
}

impl Default for PingStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_statistics_calculation() {
        let mut stats = PingStatistics::new();

        stats.record_sent();
        stats.record_received(10.5);

        stats.record_sent();
        stats.record_received(20.3);

        stats.record_sent();
        stats.record_failed();

        assert_eq!(stats.packets_sent, 3);
        assert_eq!(stats.packets_received, 2);
        assert_eq!(stats.packets_failed, 1);
        assert!((stats.loss_percentage() - 33.333333333333336).abs() < 0.0001);
        assert_eq!(stats.average_time(), 15.4);
        assert_eq!(stats.min_time, 10.5);
        assert_eq!(stats.max_time, 20.3);
    }

    #[test]
    fn test_loss_is_not_truncated() {
        let mut stats = PingStatistics::new();
        for _ in 0..4 {
            stats.record_sent();
        }
        stats.record_failed();
        assert_eq!(stats.loss_percentage(), 25.0);

        for (sent, failed) in [(3u32, 2u32), (7, 1), (10, 10), (1, 0)] {
            let stats = PingStatistics {
                packets_sent: sent,
                packets_failed: failed,
                ..PingStatistics::new()
            };
            assert_eq!(stats.loss_percentage(), 100.0 * failed as f64 / sent as f64);
        }
    }

    #[test]
    fn test_no_probes_means_no_loss() {
        assert_eq!(PingStatistics::new().loss_percentage(), 0.0);
    }

    #[test]
    fn test_response_formatting() {
        let stats = PingStatistics::new();
        let mut response = IcmpResponse {
            source: Ipv4Addr::new(8, 8, 8, 8),
            bytes: 32,
            time_ms: 15.7,
            ttl: Some(64),
            sequence: 1,
        };

        let formatted = stats.format_response(&response);
        assert_eq!(formatted, "来自 8.8.8.8 的回复: 字节=32 时间=16ms TTL=64");

        response.ttl = None;
        response.time_ms = 0.3;
        assert_eq!(stats.format_response(&response), "来自 8.8.8.8 的回复: 字节=32 时间=<1ms");
    }

    #[test]
    fn test_failure_formatting() {
        let stats = PingStatistics::new();
        assert_eq!(stats.format_failure(&ProbeError::Timeout), "请求超时。");

        let refused = ProbeError::Connect(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(stats.format_failure(&refused), "错误: Cannot reach remote host: denied");
    }

    #[test]
    fn test_summary_formatting() {
        let mut stats = PingStatistics::new();
        stats.record_sent();
        stats.record_received(10.0);
        stats.record_sent();
        stats.record_failed();

        let summary = stats.format_summary("8.8.8.8");
        assert!(summary.contains("8.8.8.8 的 Ping 统计信息"));
        assert!(summary.contains("已发送 = 2"));
        assert!(summary.contains("已接收 = 1"));
        assert!(summary.contains("丢失 = 1"));
        assert!(summary.contains("(50.0% 丢失)"));
        assert!(summary.contains("最短 = 10ms，最长 = 10ms，平均 = 10ms"));
    }

    #[test]
    fn test_summary_without_replies_omits_times() {
        let mut stats = PingStatistics::new();
        stats.record_sent();
        stats.record_failed();

        let summary = stats.format_summary("10.0.0.1");
        assert!(summary.contains("(100.0% 丢失)"));
        assert!(!summary.contains("往返行程"));
    }

    #[test]
    fn test_header_formatting() {
        let stats = PingStatistics::new();
        let ip = Ipv4Addr::new(127, 0, 0, 1);
        assert_eq!(stats.format_header("127.0.0.1", &ip, 32), "正在 Ping 127.0.0.1 具有 32 字节的数据:");
        assert_eq!(
            stats.format_header("localhost", &ip, 32),
            "正在 Ping localhost [127.0.0.1] 具有 32 字节的数据:"
        );
    }

    #[test]
    fn test_header_reports_payload_not_packet_size() {
        let stats = PingStatistics::new();
        let config = crate::config::ProbeConfig::default();
        let ip = Ipv4Addr::new(10, 0, 0, 1);

        let header = stats.format_header("10.0.0.1", &ip, config.payload_size);
        assert_eq!(header, "正在 Ping 10.0.0.1 具有 32 字节的数据:");
        assert!(!header.contains(&config.packet_size().to_string()));
    }
}
