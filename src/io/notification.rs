//! Desktop notifications after a theme switch.

use anyhow::{Context, Result};

use crate::core::classification::Classification;

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str) -> Result<()>;
}

/// Best-effort desktop notification through the platform's notification tool.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    #[cfg(not(windows))]
    fn notify(&self, summary: &str, body: &str) -> Result<()> {
        if !crate::common::utils::command_exists("notify-send") {
            anyhow::bail!("notify-send is not installed");
        }
        let status = std::process::Command::new("notify-send")
            .args(["--app-name=autotheme", "--expire-time=5000", summary, body])
            .status()
            .context("Failed to run notify-send")?;
        if !status.success() {
            anyhow::bail!("notify-send exited with {status}");
        }
        Ok(())
    }

    #[cfg(windows)]
    fn notify(&self, summary: &str, body: &str) -> Result<()> {
        // msg.exe shows a session message box without extra dependencies
        let status = std::process::Command::new("msg")
            .args(["*", "/TIME:5", &format!("{summary}: {body}")])
            .status()
            .context("Failed to run msg")?;
        if !status.success() {
            anyhow::bail!("msg exited with {status}");
        }
        Ok(())
    }
}

/// Notifier that drops every message.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _summary: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}

/// Summary and body for a theme switch.
pub fn switch_message(to: Classification) -> (&'static str, &'static str) {
    match to {
        Classification::Day => ("Daytime theme", "Switched to the light theme for the day"),
        Classification::Night => ("Nighttime theme", "Switched to the dark theme for the night"),
    }
}
