//! `install` and `uninstall`: manage the login autostart entry.
//!
//! The `start_at_login` config key is kept in step with what is registered.

use anyhow::Result;

use crate::config;
use crate::io::autostart as login;

pub fn handle_install_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let created = login::install()?;
    log_block_start!("autotheme will start at login");
    log_indented!("{created}");

    config::update_start_at_login(true)?;
    if debug_enabled {
        log_pipe!();
        log_debug!("Set start_at_login = true");
    }

    log_end!();
    Ok(())
}

pub fn handle_uninstall_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    if login::uninstall()? {
        log_block_start!("Removed the login autostart entry");
    } else {
        log_block_start!("No login autostart entry was installed");
    }

    config::update_start_at_login(false)?;
    if debug_enabled {
        log_pipe!();
        log_debug!("Set start_at_login = false");
    }

    log_end!();
    Ok(())
}

/// Display detailed help for install/uninstall (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("install, uninstall - Manage starting at login");
    log_block_start!("Usage:");
    log_indented!("autotheme install");
    log_indented!("autotheme uninstall");
    log_block_start!("Description:");
    log_indented!("install registers 'autotheme boot' to run shortly after login:");
    log_indented!("an XDG autostart entry on Linux, a scheduled task on Windows.");
    log_indented!("uninstall removes it. Both update start_at_login in the config.");
    log_end!();
}
