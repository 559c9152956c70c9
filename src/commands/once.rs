//! One-shot evaluation (`autotheme once`, alias `boot`).
//!
//! Runs exactly one tick through the same scheduler path the daemon uses and
//! exits. This is what the login autostart entry launches. When a daemon is
//! already running the check is delegated to it instead, so two processes never
//! drive the theme at the same time.

use anyhow::{Context, Result};

use super::report_response;
use crate::app::build_scheduler;
use crate::config::Config;
use crate::core::report_tick_outcome;
use crate::core::scheduler::TickOutcome;
use crate::ipc::{self, IpcRequest};

pub fn handle_once_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    if let Some(response) = ipc::request(IpcRequest::Check)? {
        log_block_start!("A running instance was found, asking it to check");
        report_response(&response)?;
        log_end!();
        return Ok(());
    }

    let config = Config::load().context("Configuration failed")?;
    let scheduler = build_scheduler(&config, false)?;

    if debug_enabled {
        log_pipe!();
        log_debug!("Evaluating once with the {} backend", scheduler.applier_name());
    }

    let outcome = scheduler.tick();
    report_tick_outcome(&outcome, debug_enabled);
    finish(&outcome)?;

    log_end!();
    Ok(())
}

/// Exit status for a one-shot run: only a failed apply is an error. Missing
/// sunrise/sunset data leaves the desktop untouched and is reported as a warning.
fn finish(outcome: &TickOutcome) -> Result<()> {
    match outcome {
        TickOutcome::ApplyFailed { to, error, .. } => {
            anyhow::bail!("Failed to apply {to} theme: {error}")
        }
        TickOutcome::Unknown => {
            log_pipe!();
            log_warning!("No sunrise/sunset data for today; theme left unchanged");
        }
        TickOutcome::Unchanged(classification) => {
            log_block_start!("Theme already {classification}");
        }
        TickOutcome::Applied { .. } | TickOutcome::Skipped | TickOutcome::Superseded => {}
    }
    Ok(())
}

/// Display detailed help for the once command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("once - Apply the theme for the current time and exit");
    log_block_start!("Usage: autotheme once");
    log_indented!("Alias: autotheme boot");
    log_block_start!("Description:");
    log_indented!("Fetches today's sunrise and sunset, applies the matching theme");
    log_indented!("and exits. This is what the login autostart entry runs.");
    log_indented!("If autotheme is already running, it is asked to check instead.");
    log_indented!("Output also goes to the log file, and to the terminal when run from one.");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classification::Classification;

    #[test]
    fn test_only_apply_failure_is_an_error() {
        crate::common::logger::Log::set_enabled(false);

        let failed = TickOutcome::ApplyFailed {
            from: None,
            to: Classification::Night,
            error: "gsettings exited with 1".to_string(),
        };
        let err = finish(&failed).unwrap_err();
        assert!(err.to_string().contains("Night"));

        assert!(finish(&TickOutcome::Unknown).is_ok());
        assert!(finish(&TickOutcome::Unchanged(Classification::Day)).is_ok());
        assert!(
            finish(&TickOutcome::Applied {
                from: None,
                to: Classification::Day
            })
            .is_ok()
        );
    }
}
