//! Manual commands: `check`, `day` and `night`.

use anyhow::{Context, Result};

use super::report_response;
use crate::config::Config;
use crate::core::classification::Classification;
use crate::ipc::{self, IpcRequest};
use crate::theme::{self, ThemeApplier};

/// Ask the running instance to re-evaluate immediately.
pub fn handle_check_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(response) = ipc::request(IpcRequest::Check)? else {
        anyhow::bail!("autotheme isn't running; use 'autotheme once' for a one-off check");
    };
    report_response(&response)?;

    if debug_enabled && let Some(status) = &response.status {
        for line in super::status::status_lines(status) {
            log_indented!("{line}");
        }
    }

    log_end!();
    Ok(())
}

/// Force a theme through the running instance, or directly when none is running.
pub fn handle_force_command(classification: Classification, debug_enabled: bool) -> Result<()> {
    log_version!();

    let request = match classification {
        Classification::Day => IpcRequest::ForceDay,
        Classification::Night => IpcRequest::ForceNight,
    };

    match ipc::request(request)? {
        Some(response) => {
            report_response(&response)?;
            log_indented!("The next scheduled check returns to the sunrise/sunset schedule");
        }
        None => {
            if debug_enabled {
                log_pipe!();
                log_debug!("No running instance, applying directly");
            }
            let config = Config::load().context("Configuration failed")?;
            let applier = theme::create_applier(&config)?;
            apply_directly(applier.as_ref(), classification)?;
        }
    }

    log_end!();
    Ok(())
}

fn apply_directly(applier: &dyn ThemeApplier, classification: Classification) -> Result<()> {
    applier
        .apply(classification)
        .with_context(|| format!("Failed to apply {classification} theme"))?;
    log_block_start!("Switched to {classification} theme ({})", applier.name());
    Ok(())
}

/// Display detailed help for the manual commands (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("check, day, night - Control the running instance");
    log_block_start!("Usage:");
    log_indented!("autotheme check     Re-evaluate now (alias: c)");
    log_indented!("autotheme day       Switch to the day theme");
    log_indented!("autotheme night     Switch to the night theme");
    log_block_start!("Description:");
    log_indented!("A forced theme stays until the next scheduled check disagrees");
    log_indented!("with it. Without a running instance, day and night apply the");
    log_indented!("theme directly using the configured backend.");
    log_end!();
}
