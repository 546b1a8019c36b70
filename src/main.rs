mod checksum;
mod cli;
mod config;
mod dns;
mod icmp;
mod session;
mod stats;
mod utils;

use icmp::RawSocketTransport;
use session::ProbeSession;
use stats::PingStatistics;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Enable debug logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    }

    // Parse and validate command line arguments
    let config = match cli::parse_args() {
        Ok(config) => config,
        Err(e) => {
            utils::exit_with_error(&format!("参数解析错误: {}", e), 1);
        }
    };

    // Resolve target hostname once, before any socket is opened
    let target_ip = match dns::resolve_target(&config.target).await {
        Ok(ip) => ip,
        Err(e) => {
            utils::exit_with_error(&format!("无法解析主机名 '{}': {}", config.target, e), 1);
        }
    };

    utils::check_privileges();

    println!(
        "{}",
        PingStatistics::new().format_header(&config.target, &target_ip, config.payload_size)
    );
    log::debug!("Echo requests are {} bytes on the wire", config.packet_size());

    // Setup signal handler for Ctrl+C
    let shutdown = utils::setup_signal_handler();

    let identifier = utils::generate_identifier();
    log::debug!("Using ICMP identifier {:#06x}", identifier);

    let mut session = ProbeSession::new(RawSocketTransport::new(), target_ip, config, identifier);
    let mut stdout = std::io::stdout();

    if let Err(e) = session.run(&mut stdout, shutdown).await {
        utils::exit_with_error(&format!("无法写入输出: {}", e), 1);
    }
}
