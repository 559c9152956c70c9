//! Implementation of the status command.
//!
//! With a running instance the scheduler's snapshot is shown. Otherwise the
//! configured backend is asked what the desktop currently shows.

use anyhow::{Context, Result};

use crate::common::utils::format_coordinates;
use crate::config::Config;
use crate::core::scheduler::SchedulerStatus;
use crate::core::window::Daylight;
use crate::io::{autostart, lock};
use crate::ipc::{self, IpcRequest};
use crate::theme::{self, ThemeApplier};

pub fn handle_status_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    match ipc::request(IpcRequest::Status)? {
        Some(response) => {
            match lock::running_instance() {
                Some(pid) => log_block_start!("autotheme is running (PID: {pid})"),
                None => log_block_start!("autotheme is running"),
            }
            if let Some(status) = &response.status {
                for line in status_lines(status) {
                    log_indented!("{line}");
                }
                if debug_enabled {
                    log_pipe!();
                    log_debug!("State generation: {}", status.generation);
                }
            }
        }
        None => {
            match lock::running_instance() {
                Some(pid) => log_block_start!("autotheme is running (PID: {pid}) but not answering"),
                None => log_block_start!("autotheme is not running"),
            }
            let config = Config::load().context("Configuration failed")?;
            let applier = theme::create_applier(&config)?;
            log_indented!("{}", describe_desktop(applier.as_ref()));
            let location = config.location()?;
            log_indented!(
                "Location: {}",
                format_coordinates(location.latitude, location.longitude)
            );
        }
    }

    log_indented!(
        "Start at login: {}",
        if autostart::is_installed() { "installed" } else { "not installed" }
    );
    log_end!();
    Ok(())
}

/// Lines describing a scheduler snapshot.
pub(crate) fn status_lines(status: &SchedulerStatus) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match status.classification {
        Some(classification) => format!("Theme: {classification}"),
        None => format!(
            "Theme: {} (default, nothing applied yet)",
            status.effective_classification
        ),
    });

    lines.push(match (&status.window, status.window_current) {
        (Some(window), true) => match window.daylight() {
            Daylight::Between { start, end } => format!(
                "Today: sunrise {}, sunset {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            Daylight::MidnightSun => "Today: midnight sun, no sunset".to_string(),
            Daylight::PolarNight => "Today: polar night, no sunrise".to_string(),
        },
        (Some(window), false) => format!(
            "Today: no sunrise/sunset data (last known is for {})",
            window.for_date()
        ),
        (None, _) => "Today: no sunrise/sunset data yet".to_string(),
    });

    lines.push(match status.last_successful_fetch {
        Some(at) => format!("Last update: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => "Last update: never".to_string(),
    });

    lines.push(format!(
        "Location: {}",
        format_coordinates(status.location.latitude, status.location.longitude)
    ));
    lines.push(format!("Backend: {}", status.applier));

    if status.fetch_in_flight {
        lines.push("Fetching sunrise/sunset now".to_string());
    }

    lines
}

fn describe_desktop(applier: &dyn ThemeApplier) -> String {
    match applier.describe_current() {
        Ok(mode) => format!("Desktop theme: {mode} ({})", applier.name()),
        Err(e) => format!("Desktop theme: unknown ({e})"),
    }
}

/// Display detailed help for the status command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("status - Show the current theme and schedule");
    log_block_start!("Usage: autotheme status");
    log_indented!("Alias: autotheme s");
    log_block_start!("Description:");
    log_indented!("Shows the running instance's theme, today's sunrise and sunset,");
    log_indented!("the last successful update and the configured location.");
    log_indented!("Without a running instance, shows what the desktop currently uses.");
    log_end!();
}
