//! Configuration validation.
//!
//! Location errors are returned as [`ConfigError`] inside the `anyhow` chain so
//! callers can downcast and report them specifically.

use anyhow::Result;

use super::{Config, ConfigError};
use crate::common::constants::*;
use crate::core::window::Location;

/// Validate every field that is present in `config`.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.latitude.is_some() || config.longitude.is_some() {
        validate_location(
            config.latitude.unwrap_or(DEFAULT_LATITUDE),
            config.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )?;
    }

    if let Some(interval) = config.poll_interval
        && !(MINIMUM_POLL_INTERVAL..=MAXIMUM_POLL_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "poll_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_POLL_INTERVAL,
            MAXIMUM_POLL_INTERVAL
        );
    }

    if let Some(timeout) = config.request_timeout
        && !(MINIMUM_REQUEST_TIMEOUT..=MAXIMUM_REQUEST_TIMEOUT).contains(&timeout)
    {
        anyhow::bail!(
            "request_timeout ({} seconds) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT,
            MAXIMUM_REQUEST_TIMEOUT
        );
    }

    if let Some(ref url) = config.api_url {
        let url = url.trim();
        if url.is_empty() {
            anyhow::bail!("api_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("api_url must start with http:// or https:// (got '{}')", url);
        }
    }

    Ok(())
}

/// Check a coordinate pair without touching any file.
pub fn validate_location(latitude: f64, longitude: f64) -> Result<Location, ConfigError> {
    Location::new(latitude, longitude)
}
