//! Start-at-login registration.
//!
//! Linux uses an XDG autostart entry; Windows uses a logon scheduled task.
//! Both launch `autotheme boot` after a short delay so the desktop session
//! is ready before the first theme change.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::common::constants::AUTOSTART_DELAY_SECS;

pub const AUTOSTART_NAME: &str = "autotheme";

/// Command line run at login.
pub fn boot_command(exe: &Path) -> String {
    format!("\"{}\" boot", exe.display())
}

/// Contents of the XDG `.desktop` autostart entry.
pub fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=autotheme\n\
         Comment=Switch between light and dark themes at sunrise and sunset\n\
         Exec={}\n\
         X-GNOME-Autostart-enabled=true\n\
         X-GNOME-Autostart-Delay={}\n\
         NoDisplay=true\n",
        boot_command(exe),
        AUTOSTART_DELAY_SECS
    )
}

/// `~/.config/autostart`.
pub fn autostart_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("autostart"))
}

/// Write the autostart entry into `dir`, replacing any previous one.
pub fn install_desktop_entry(dir: &Path, exe: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("{AUTOSTART_NAME}.desktop"));
    std::fs::write(&path, desktop_entry(exe))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Remove the autostart entry from `dir`. Returns `false` if none existed.
pub fn remove_desktop_entry(dir: &Path) -> Result<bool> {
    let path = dir.join(format!("{AUTOSTART_NAME}.desktop"));
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Register autotheme to start at login. Returns a description of what was created.
pub fn install() -> Result<String> {
    let exe = std::env::current_exe().context("Could not determine executable path")?;
    install_for(&exe)
}

#[cfg(windows)]
fn install_for(exe: &Path) -> Result<String> {
    let delay = format!("0000:{AUTOSTART_DELAY_SECS:02}");
    let command = boot_command(exe);
    schtasks(&[
        "/Create", "/F", "/SC", "ONLOGON", "/DELAY", &delay, "/TN", AUTOSTART_NAME, "/TR",
        &command,
    ])?;
    Ok(format!("Scheduled task '{AUTOSTART_NAME}'"))
}

#[cfg(not(windows))]
fn install_for(exe: &Path) -> Result<String> {
    let path = install_desktop_entry(&autostart_dir()?, exe)?;
    Ok(crate::common::utils::private_path(&path))
}

/// Remove the login registration. Returns `false` if nothing was registered.
#[cfg(windows)]
pub fn uninstall() -> Result<bool> {
    if !is_installed() {
        return Ok(false);
    }
    schtasks(&["/Delete", "/F", "/TN", AUTOSTART_NAME])?;
    Ok(true)
}

#[cfg(not(windows))]
pub fn uninstall() -> Result<bool> {
    remove_desktop_entry(&autostart_dir()?)
}

#[cfg(windows)]
pub fn is_installed() -> bool {
    std::process::Command::new("schtasks")
        .args(["/Query", "/TN", AUTOSTART_NAME])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[cfg(not(windows))]
pub fn is_installed() -> bool {
    autostart_dir()
        .map(|dir| dir.join(format!("{AUTOSTART_NAME}.desktop")).is_file())
        .unwrap_or(false)
}

#[cfg(windows)]
fn schtasks(args: &[&str]) -> Result<()> {
    let output = std::process::Command::new("schtasks")
        .args(args)
        .output()
        .context("Failed to run schtasks")?;
    if !output.status.success() {
        anyhow::bail!(
            "schtasks failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_desktop_entry_runs_boot_with_delay() {
        let entry = desktop_entry(Path::new("/usr/bin/autotheme"));
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Exec=\"/usr/bin/autotheme\" boot\n"));
        assert!(entry.contains("X-GNOME-Autostart-Delay=10\n"));
    }

    #[test]
    fn test_install_and_remove_desktop_entry() {
        let dir = tempdir().unwrap();
        let autostart = dir.path().join("autostart");

        let path = install_desktop_entry(&autostart, Path::new("/opt/autotheme")).unwrap();
        assert!(path.ends_with("autotheme.desktop"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("/opt/autotheme"));

        assert!(remove_desktop_entry(&autostart).unwrap());
        assert!(!path.exists());
        assert!(!remove_desktop_entry(&autostart).unwrap());
    }
}
