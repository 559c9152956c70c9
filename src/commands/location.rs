//! `set-location`: validate and save new coordinates.
//!
//! A running instance picks the change up through its config watcher.

use anyhow::Result;

use crate::config;
use crate::io::lock;

pub fn handle_set_location_command(latitude: f64, longitude: f64) -> Result<()> {
    log_version!();

    // Out-of-range input fails here with a ConfigError and nothing is written
    config::update_coordinates(latitude, longitude)?;

    if lock::running_instance().is_some() {
        log_pipe!();
        log_info!("The running instance will switch to the new location shortly");
    }

    log_end!();
    Ok(())
}

/// Display detailed help for the set-location command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("set-location - Save new coordinates");
    log_block_start!("Usage: autotheme set-location <latitude> <longitude>");
    log_block_start!("Arguments:");
    log_indented!("latitude   Decimal degrees, -90 to 90 (south is negative)");
    log_indented!("longitude  Decimal degrees, -180 to 180 (west is negative)");
    log_block_start!("Examples:");
    log_indented!("autotheme set-location 40.7128 -74.0060");
    log_indented!("autotheme set-location -33.8688 151.2093");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_invalid_location_is_typed_error() {
        crate::common::logger::Log::set_enabled(false);
        let err = handle_set_location_command(91.0, 0.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidLocation {
                latitude: 91.0,
                longitude: 0.0
            })
        );
    }
}
