//! Command-line entry point: parse arguments, set up logging, dispatch.

use anyhow::Result;

use autotheme::args::{self, CliAction, GlobalOptions, ParsedArgs};
use autotheme::common::constants::EXIT_FAILURE;
use autotheme::common::logger::{LoggerGuard, default_log_path, start_file_logging_or_warn};
use autotheme::{Autotheme, commands, config, log_error_exit};

fn main() {
    let action = ParsedArgs::from_env().action;

    let log_guard = match setup(&action) {
        Ok(guard) => guard,
        Err(e) => {
            log_error_exit!("{e:#}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = run(action) {
        log_error_exit!("{e:#}");
        // exit() skips destructors; flush the log file first
        drop(log_guard);
        std::process::exit(EXIT_FAILURE);
    }
}

/// Apply the global options. The returned guard keeps the log file writer
/// alive until every line has been written.
fn setup(action: &CliAction) -> Result<Option<LoggerGuard>> {
    let Some(options) = global_options(action) else {
        return Ok(None);
    };

    config::set_config_dir(options.config_dir.clone())?;

    // Boot runs usually have no terminal to look at
    let log_to_file = options.log_to_file || matches!(action, CliAction::Once(_));
    if !log_to_file {
        return Ok(None);
    }
    Ok(start_file_logging_or_warn(default_log_path()))
}

fn global_options(action: &CliAction) -> Option<&GlobalOptions> {
    match action {
        CliAction::Run(options)
        | CliAction::Once(options)
        | CliAction::Check(options)
        | CliAction::Status(options)
        | CliAction::Install(options)
        | CliAction::Uninstall(options)
        | CliAction::Stop(options)
        | CliAction::Force { options, .. }
        | CliAction::SetLocation { options, .. } => Some(options),
        CliAction::Help(_)
        | CliAction::ShowVersion
        | CliAction::ShowHelp
        | CliAction::ShowHelpDueToError => None,
    }
}

fn run(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => args::display_version_info(),
        CliAction::ShowHelp => args::display_help(),
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help(command) => commands::help::run_help_command(command.as_deref())?,
        CliAction::Run(options) => Autotheme::new(options.debug_enabled).run()?,
        CliAction::Once(options) => commands::once::handle_once_command(options.debug_enabled)?,
        CliAction::Check(options) => {
            commands::manual::handle_check_command(options.debug_enabled)?
        }
        CliAction::Force {
            options,
            classification,
        } => commands::manual::handle_force_command(classification, options.debug_enabled)?,
        CliAction::Status(options) => {
            commands::status::handle_status_command(options.debug_enabled)?
        }
        CliAction::Install(options) => {
            commands::autostart::handle_install_command(options.debug_enabled)?
        }
        CliAction::Uninstall(options) => {
            commands::autostart::handle_uninstall_command(options.debug_enabled)?
        }
        CliAction::SetLocation {
            latitude,
            longitude,
            ..
        } => commands::location::handle_set_location_command(latitude, longitude)?,
        CliAction::Stop(options) => commands::stop::handle_stop_command(options.debug_enabled)?,
    }
    Ok(())
}
