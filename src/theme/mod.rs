//! Theme appliers that carry a classification out to the desktop.
//!
//! Each applier is idempotent: applying the same classification twice leaves
//! the desktop in the same state. Backend selection mirrors the `backend`
//! config key:
//!
//! - **windows**: registry `Personalize` values plus a settings-change broadcast
//! - **gnome**: `gsettings` color-scheme
//! - **dry-run**: logs only
//! - **auto**: windows on Windows, gnome when `gsettings` is on `PATH`

pub mod dry_run;
pub mod gnome;
pub mod windows;

use anyhow::Result;
use std::process::Command;

use crate::common::utils::command_exists;
use crate::config::{Backend, Config};
use crate::core::classification::Classification;

pub use dry_run::DryRunApplier;
pub use gnome::GnomeApplier;
#[cfg(windows)]
pub use windows::WindowsApplier;

/// Why the OS-level change could not be made.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("registry access failed: {0}")]
    Registry(#[source] std::io::Error),
    #[error("settings broadcast failed: {0}")]
    Broadcast(String),
    #[error("the {0} backend is not available on this platform")]
    Unsupported(&'static str),
}

/// Applies the visual state for a classification.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeApplier: Send + Sync {
    /// Backend name for logs and status output.
    fn name(&self) -> &'static str;

    fn apply(&self, classification: Classification) -> Result<(), ApplyError>;

    /// Human-readable description of the mode currently active on the desktop.
    fn describe_current(&self) -> Result<String, ApplyError>;
}

/// Resolve `Backend::Auto` to a concrete backend for this machine.
pub fn detect_backend(config: &Config) -> Result<Backend> {
    match config.backend() {
        Backend::Auto => {
            if cfg!(windows) {
                Ok(Backend::Windows)
            } else if command_exists("gsettings") {
                Ok(Backend::Gnome)
            } else {
                anyhow::bail!(
                    "Could not detect a theme backend: gsettings was not found.\n\
                     Set backend = \"gnome\", \"windows\" or \"dry-run\" in the configuration."
                )
            }
        }
        other => Ok(other),
    }
}

/// Create the applier selected by the configuration.
pub fn create_applier(config: &Config) -> Result<Box<dyn ThemeApplier>> {
    let applier: Box<dyn ThemeApplier> = match detect_backend(config)? {
        Backend::Gnome => Box::new(GnomeApplier::new()),
        Backend::DryRun => Box::new(DryRunApplier::new()),
        Backend::Windows => create_windows_applier()?,
        Backend::Auto => unreachable!("detect_backend resolves Auto"),
    };
    Ok(applier)
}

#[cfg(windows)]
fn create_windows_applier() -> Result<Box<dyn ThemeApplier>> {
    Ok(Box::new(WindowsApplier::new()))
}

#[cfg(not(windows))]
fn create_windows_applier() -> Result<Box<dyn ThemeApplier>> {
    Err(ApplyError::Unsupported("windows").into())
}

/// Run an external command and return its trimmed stdout.
pub(crate) fn run_command(program: &str, args: &[&str]) -> Result<String, ApplyError> {
    let command = format!("{program} {}", args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ApplyError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ApplyError::CommandFailed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_backend_is_kept() {
        let config = Config {
            backend: Some(Backend::DryRun),
            ..Config::default()
        };
        assert_eq!(detect_backend(&config).unwrap(), Backend::DryRun);
        let applier = create_applier(&config).unwrap();
        assert_eq!(applier.name(), "dry-run");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_windows_backend_unsupported_elsewhere() {
        let config = Config {
            backend: Some(Backend::Windows),
            ..Config::default()
        };
        let err = create_applier(&config).err().unwrap();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_run_command_missing_program() {
        let err = run_command("autotheme-definitely-missing-binary", &["--version"]).unwrap_err();
        assert!(matches!(err, ApplyError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_reports_failure_status() {
        let err = run_command("false", &[]).unwrap_err();
        assert!(matches!(err, ApplyError::CommandFailed { .. }));
    }
}
