//! Command-line argument parsing.
//!
//! Parsing is a pure function from the argument list to a [`CliAction`] so that
//! `main` can stay a flat dispatch and every path can be unit tested. Global
//! flags may appear anywhere on the line; the first positional argument is the
//! command and the remaining positionals are its operands.

use crate::core::classification::Classification;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_to_file: bool,
}

/// Represents the action to take based on command-line arguments.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon (no command given)
    Run(GlobalOptions),
    /// Evaluate once and exit (`once`, `boot`)
    Once(GlobalOptions),
    /// Ask the running instance to check now (`check`, `c`)
    Check(GlobalOptions),
    /// Force a theme (`day`, `night`)
    Force {
        options: GlobalOptions,
        classification: Classification,
    },
    /// Show daemon state or the current desktop mode (`status`, `s`)
    Status(GlobalOptions),
    /// Register the login autostart entry
    Install(GlobalOptions),
    /// Remove the login autostart entry
    Uninstall(GlobalOptions),
    /// Validate and save coordinates
    SetLocation {
        options: GlobalOptions,
        latitude: f64,
        longitude: f64,
    },
    /// Terminate the running instance
    Stop(GlobalOptions),
    /// `help [command]`
    Help(Option<String>),
    ShowVersion,
    ShowHelp,
    /// Parsing failed; the reason has already been logged
    ShowHelpDueToError,
}

/// Parsed command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse arguments, including the program name in position 0.
    pub fn parse<I, T>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|arg| arg.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut show_help = false;
        let mut show_version = false;
        let mut positionals: Vec<String> = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => options.debug_enabled = true,
                "--log" | "-l" => options.log_to_file = true,
                "--help" | "-h" => show_help = true,
                "--version" | "-V" | "-v" => show_version = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) if !dir.starts_with('-') => options.config_dir = Some(dir),
                    _ => {
                        log_warning_standalone!("--config requires a directory path");
                        return Self::error();
                    }
                },
                // Negative coordinates are operands, not flags
                flag if flag.starts_with('-') && flag.parse::<f64>().is_err() => {
                    log_warning_standalone!("Unknown option: {flag}");
                    return Self::error();
                }
                _ => positionals.push(arg),
            }
        }

        // Version takes precedence over help, help over any command
        if show_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let mut positionals = positionals.into_iter();
        let command = positionals.next();
        let operands: Vec<String> = positionals.collect();

        if show_help {
            return ParsedArgs {
                action: match command {
                    Some(command) => CliAction::Help(Some(command)),
                    None => CliAction::ShowHelp,
                },
            };
        }

        let Some(command) = command else {
            return ParsedArgs {
                action: CliAction::Run(options),
            };
        };

        let action = match command.as_str() {
            "help" => {
                if operands.len() > 1 {
                    return Self::unexpected(&command, &operands[1..]);
                }
                return ParsedArgs {
                    action: CliAction::Help(operands.into_iter().next()),
                };
            }
            "set-location" => return Self::parse_set_location(options, &operands),
            "once" | "boot" => CliAction::Once(options),
            "check" | "c" => CliAction::Check(options),
            "day" => CliAction::Force {
                options,
                classification: Classification::Day,
            },
            "night" => CliAction::Force {
                options,
                classification: Classification::Night,
            },
            "status" | "s" => CliAction::Status(options),
            "install" => CliAction::Install(options),
            "uninstall" => CliAction::Uninstall(options),
            "stop" => CliAction::Stop(options),
            unknown => {
                log_warning_standalone!("Unknown command: {unknown}");
                return Self::error();
            }
        };

        if !operands.is_empty() {
            return Self::unexpected(&command, &operands);
        }

        ParsedArgs { action }
    }

    /// Parse from the process arguments.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }

    fn parse_set_location(options: GlobalOptions, operands: &[String]) -> ParsedArgs {
        let [latitude, longitude] = operands else {
            log_warning_standalone!("set-location expects exactly two values: <latitude> <longitude>");
            return Self::error();
        };

        match (latitude.parse::<f64>(), longitude.parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                ParsedArgs {
                    action: CliAction::SetLocation {
                        options,
                        latitude,
                        longitude,
                    },
                }
            }
            _ => {
                log_warning_standalone!(
                    "Invalid coordinates: {latitude} {longitude} (expected decimal degrees)"
                );
                Self::error()
            }
        }
    }

    fn unexpected(command: &str, extra: &[String]) -> ParsedArgs {
        log_warning_standalone!("Unexpected argument for '{command}': {}", extra.join(" "));
        Self::error()
    }

    fn error() -> ParsedArgs {
        ParsedArgs {
            action: CliAction::ShowHelpDueToError,
        }
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("autotheme [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-l, --log              Write output to the log file");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("once, boot             Apply the theme for the current time and exit");
    log_indented!("check, c               Make the running instance check now");
    log_indented!("day, night             Force the day or night theme");
    log_indented!("status, s              Show the current theme and schedule");
    log_indented!("install, uninstall     Add or remove the login autostart entry");
    log_indented!("set-location <lat> <lon>  Save new coordinates");
    log_indented!("stop                   Stop the running instance");
    log_indented!("help [COMMAND]         Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: Vec<&str>) -> CliAction {
        crate::common::logger::Log::set_enabled(false);
        ParsedArgs::parse(args).action
    }

    fn debug() -> GlobalOptions {
        GlobalOptions {
            debug_enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(vec!["autotheme"]),
            CliAction::Run(GlobalOptions::default())
        );
    }

    #[test]
    fn test_parse_global_flags() {
        assert_eq!(parse(vec!["autotheme", "--debug"]), CliAction::Run(debug()));
        assert_eq!(parse(vec!["autotheme", "-d"]), CliAction::Run(debug()));
        assert_eq!(
            parse(vec!["autotheme", "-l", "--config", "/tmp/conf"]),
            CliAction::Run(GlobalOptions {
                debug_enabled: false,
                config_dir: Some("/tmp/conf".to_string()),
                log_to_file: true,
            })
        );
    }

    #[test]
    fn test_parse_config_requires_value() {
        assert_eq!(
            parse(vec!["autotheme", "--config"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(vec!["autotheme", "-c", "--debug"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(vec!["autotheme", "--help"]), CliAction::ShowHelp);
        assert_eq!(parse(vec!["autotheme", "-h"]), CliAction::ShowHelp);
        assert_eq!(parse(vec!["autotheme", "--version"]), CliAction::ShowVersion);
        assert_eq!(parse(vec!["autotheme", "-V"]), CliAction::ShowVersion);
        assert_eq!(parse(vec!["autotheme", "-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_version_takes_precedence_over_help() {
        assert_eq!(
            parse(vec!["autotheme", "--help", "--version"]),
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_help_flag_with_command_shows_command_help() {
        assert_eq!(
            parse(vec!["autotheme", "status", "--help"]),
            CliAction::Help(Some("status".to_string()))
        );
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(parse(vec!["autotheme", "help"]), CliAction::Help(None));
        assert_eq!(
            parse(vec!["autotheme", "help", "set-location"]),
            CliAction::Help(Some("set-location".to_string()))
        );
        assert_eq!(
            parse(vec!["autotheme", "help", "day", "night"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_commands_and_aliases() {
        let none = GlobalOptions::default();
        assert_eq!(parse(vec!["autotheme", "once"]), CliAction::Once(none.clone()));
        assert_eq!(parse(vec!["autotheme", "boot"]), CliAction::Once(none.clone()));
        assert_eq!(parse(vec!["autotheme", "check"]), CliAction::Check(none.clone()));
        assert_eq!(parse(vec!["autotheme", "c"]), CliAction::Check(none.clone()));
        assert_eq!(parse(vec!["autotheme", "status"]), CliAction::Status(none.clone()));
        assert_eq!(parse(vec!["autotheme", "s"]), CliAction::Status(none.clone()));
        assert_eq!(parse(vec!["autotheme", "install"]), CliAction::Install(none.clone()));
        assert_eq!(
            parse(vec!["autotheme", "uninstall"]),
            CliAction::Uninstall(none.clone())
        );
        assert_eq!(parse(vec!["autotheme", "stop"]), CliAction::Stop(none));
    }

    #[test]
    fn test_parse_force_commands() {
        assert_eq!(
            parse(vec!["autotheme", "day"]),
            CliAction::Force {
                options: GlobalOptions::default(),
                classification: Classification::Day,
            }
        );
        assert_eq!(
            parse(vec!["autotheme", "--debug", "night"]),
            CliAction::Force {
                options: debug(),
                classification: Classification::Night,
            }
        );
    }

    #[test]
    fn test_flags_after_command() {
        assert_eq!(parse(vec!["autotheme", "once", "--debug"]), CliAction::Once(debug()));
    }

    #[test]
    fn test_parse_set_location() {
        assert_eq!(
            parse(vec!["autotheme", "set-location", "40.7128", "-74.0060"]),
            CliAction::SetLocation {
                options: GlobalOptions::default(),
                latitude: 40.7128,
                longitude: -74.006,
            }
        );
    }

    #[test]
    fn test_parse_set_location_negative_latitude() {
        assert_eq!(
            parse(vec!["autotheme", "set-location", "-33.8688", "151.2093"]),
            CliAction::SetLocation {
                options: GlobalOptions::default(),
                latitude: -33.8688,
                longitude: 151.2093,
            }
        );
    }

    #[test]
    fn test_parse_set_location_errors() {
        assert_eq!(
            parse(vec!["autotheme", "set-location", "40.0"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(vec!["autotheme", "set-location", "north", "west"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(vec!["autotheme", "set-location", "NaN", "1.0"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_out_of_range_coordinates_still_parse() {
        // Range checking belongs to the config layer so the error is typed
        assert!(matches!(
            parse(vec!["autotheme", "set-location", "91", "0"]),
            CliAction::SetLocation { latitude, .. } if latitude == 91.0
        ));
    }

    #[test]
    fn test_unknown_command_and_flag() {
        assert_eq!(
            parse(vec!["autotheme", "sunrise"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(vec!["autotheme", "--frobnicate"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_extra_operands_rejected() {
        assert_eq!(
            parse(vec!["autotheme", "day", "now"]),
            CliAction::ShowHelpDueToError
        );
    }
}
