//! Watch mode command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use matwatch_core::{Refresh, SessionOptions};
use tracing::{error, info};

use crate::cli_utils::open_session;
use crate::shutdown::ShutdownSignal;

/// Run the watch loop until Ctrl-C, process exit or `polls` refreshes
pub fn run(
    pid: u32,
    address: u64,
    layout: Option<&str>,
    interval_ms: u64,
    polls: Option<u64>,
    check_content: bool,
) -> Result<()> {
    let shutdown = setup_shutdown_handler()?;
    let options = SessionOptions {
        check_content,
        ..SessionOptions::default()
    };
    let mut session = open_session(pid, address, layout, options)?;
    let interval = Duration::from_millis(interval_ms);

    println!(
        "Watching 0x{:X} in process {} every {} ms (Ctrl+C to stop)",
        address, pid, interval_ms
    );

    let mut count: u64 = 0;
    let mut last_absent = false;
    while !shutdown.is_shutdown() {
        if polls.is_some_and(|limit| count >= limit) {
            break;
        }
        count += 1;

        match session.refresh() {
            Ok(Refresh::Ready(sample)) => {
                last_absent = false;
                let mapping = sample
                    .display
                    .as_ref()
                    .map_or_else(|| "none".to_string(), |d| format!("{:?}", d.mapping));
                println!(
                    "[{}] new frame {}x{} {} step {} checksum {} display {}",
                    sample.captured_at.format("%H:%M:%S%.3f"),
                    sample.width,
                    sample.height,
                    sample.type_description(),
                    sample.stride.actual,
                    sample
                        .checksum
                        .map_or_else(|| "-".to_string(), |c| format!("{:08X}", c)),
                    mapping
                );
            }
            Ok(Refresh::Stale(_)) => {
                last_absent = false;
            }
            Ok(Refresh::Absent) => {
                if !last_absent {
                    println!("No matrix at 0x{:X}", address);
                }
                last_absent = true;
                if !session.is_process_alive() {
                    println!("Process {} exited.", pid);
                    break;
                }
            }
            Err(e) => error!("Refresh failed: {}", e),
        }

        if shutdown.wait(interval) {
            break;
        }
    }

    session.detach();
    info!("Watch finished after {} refreshes", count);
    println!("Shutdown complete.");
    Ok(())
}

/// Setup graceful shutdown handler with Ctrl+C
fn setup_shutdown_handler() -> Result<Arc<ShutdownSignal>> {
    let shutdown = Arc::new(ShutdownSignal::new());

    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        shutdown_ctrlc.trigger();
    })?;

    Ok(shutdown)
}
