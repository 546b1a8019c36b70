use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;

use crate::config::{self, ProbeConfig};

pub fn build_cli() -> Command {
    Command::new("icmping")
        .version("0.1.0")
        .about("Send ICMP echo requests to a host and report round-trip times")
        .arg(
            Arg::new("target")
                .help("Target hostname or IPv4 address")
                .required(true)
                .index(1)
        )
        .arg(
            Arg::new("continuous")
                .short('t')
                .help("Ping the specified host until stopped with Ctrl+C")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("count")
                .short('n')
                .help("Number of echo requests to send")
                .value_name("count")
                .value_parser(clap::value_parser!(u32))
        )
        .arg(
            Arg::new("size")
                .short('l')
                .help("Send buffer size")
                .value_name("size")
                .value_parser(clap::value_parser!(usize))
        )
        .arg(
            Arg::new("timeout")
                .short('w')
                .help("Timeout in milliseconds to wait for each reply")
                .value_name("timeout")
                .value_parser(clap::value_parser!(u32))
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .help("Delay in milliseconds between two echo requests")
                .value_name("ms")
                .value_parser(clap::value_parser!(u64))
        )
        .arg(
            Arg::new("recv_buffer")
                .long("recv-buffer")
                .help("Receive buffer size in bytes, IP header included")
                .value_name("bytes")
                .value_parser(clap::value_parser!(usize))
        )
}

/// Parses the process arguments; `--help`, `--version` and usage errors are
/// reported by clap itself.
pub fn parse_args() -> anyhow::Result<ProbeConfig> {
    config_from_matches(&build_cli().get_matches())
}

#[cfg(test)]
pub fn parse_from<I, T>(args: I) -> anyhow::Result<ProbeConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;
    config_from_matches(&matches)
}

fn config_from_matches(matches: &ArgMatches) -> anyhow::Result<ProbeConfig> {
    let mut config = ProbeConfig::default();

    config.target = matches.get_one::<String>("target").cloned().unwrap_or_default();
    config.continuous = matches.get_flag("continuous");

    if let Some(count) = matches.get_one::<u32>("count") {
        config.count = Some(*count);
    }

    if let Some(size) = matches.get_one::<usize>("size") {
        config.payload_size = *size;
    }

    if let Some(timeout) = matches.get_one::<u32>("timeout") {
        config.timeout = Duration::from_millis(*timeout as u64);
    }

    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.interval = Duration::from_millis(*interval);
    }

    config.recv_buffer_size = match matches.get_one::<usize>("recv_buffer") {
        Some(size) => *size,
        None => config::recv_buffer_for(config.payload_size),
    };

    if config.continuous {
        config.count = None; // Continuous mode overrides count
    }

    config.validate()?;
    Ok(config)
}
