//! Help command implementation for autotheme.
//!
//! Dispatches `autotheme help [COMMAND]` to the per-command help screens.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("once") | Some("boot") => super::once::display_help(),
        Some("check") | Some("c") | Some("day") | Some("night") => super::manual::display_help(),
        Some("status") | Some("s") => super::status::display_help(),
        Some("install") | Some("uninstall") => super::autostart::display_help(),
        Some("set-location") => super::location::display_help(),
        Some("stop") => super::stop::display_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {unknown}");
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("once, boot                 Apply the theme for the current time and exit");
    log_indented!("check, c                   Make the running instance check now");
    log_indented!("day, night                 Force the day or night theme");
    log_indented!("status, s                  Show the current theme and schedule");
    log_indented!("install, uninstall         Add or remove the login autostart entry");
    log_indented!("set-location <lat> <lon>   Save new coordinates");
    log_indented!("stop                       Stop the running instance");
    log_indented!("help [COMMAND]             Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'autotheme help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'autotheme --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: autotheme help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("autotheme help");
    log_indented!("autotheme help set-location");
    log_end!();
}
