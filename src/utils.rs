use std::future::Future;
use std::process;

/// Generate a random identifier for ICMP packets, fixed for the whole run
pub fn generate_identifier() -> u16 {
    use rand::Rng;
    rand::thread_rng().gen_range(1..=65535)
}

/// Warn early when raw sockets are unavailable. The run still goes ahead and
/// every probe reports its own connect failure.
pub fn check_privileges() {
    if !crate::icmp::check_raw_socket_privileges() {
        log::warn!("Raw ICMP socket could not be opened");
        print_warning("无法创建 Raw Socket，可能需要管理员权限或 CAP_NET_RAW");
    }
}

/// Print error message and exit with error code
pub fn exit_with_error(message: &str, code: i32) -> ! {
    println!("icmping: {}", message);
    process::exit(code);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("警告: {}", message);
}

/// Format time duration for display
pub fn format_time(ms: f64) -> String {
    if ms < 1.0 {
        "<1ms".to_string()
    } else {
        format!("{:.0}ms", ms)
    }
}

/// Handle Ctrl+C signal for graceful shutdown.
///
/// The listener is spawned right away so the handler is installed before the
/// first probe; the returned future completes once Ctrl+C is pressed.
pub fn setup_signal_handler() -> impl Future<Output = ()> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => log::warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    async move {
        if rx.await.is_err() {
            // No listener: never report an interrupt
            std::future::pending::<()>().await;
        }
    }
}
