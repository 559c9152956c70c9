//! Implementation of the stop command.
//!
//! Sends SIGTERM to the instance recorded in the lock file and waits for it to
//! release the lock.

use anyhow::Result;
use std::time::Duration;

use crate::common::utils::{is_process_running, terminate_process};
use crate::io::lock;

const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const STOP_POLL: Duration = Duration::from_millis(100);

/// Handle the stop command to terminate a running autotheme instance.
pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(pid) = lock::running_instance() else {
        anyhow::bail!("autotheme isn't running");
    };

    log_block_start!("Stopping autotheme instance (PID: {pid})...");
    if !terminate_process(pid) {
        anyhow::bail!("Failed to signal process {pid}");
    }
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGTERM sent to process {pid}");
    }

    let attempts = STOP_TIMEOUT.as_millis() / STOP_POLL.as_millis();
    for _ in 0..attempts {
        if !is_process_running(pid) {
            log_pipe!();
            log_info!("Process terminated successfully");
            log_end!();
            return Ok(());
        }
        std::thread::sleep(STOP_POLL);
    }

    log_pipe!();
    log_warning!("Process did not terminate within the expected time");
    log_indented!("The termination signal was sent, but the process may still be shutting down");
    log_end!();
    Ok(())
}

/// Display detailed help for the stop command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("stop - Stop the running instance");
    log_block_start!("Usage: autotheme stop");
    log_block_start!("Description:");
    log_indented!("Cleanly terminate the running autotheme instance. The desktop");
    log_indented!("keeps whatever theme was applied last.");
    log_end!();
}
