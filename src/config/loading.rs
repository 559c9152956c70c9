//! Configuration loading functionality.
//!
//! Resolves the config path, creates the default file when missing, and parses,
//! validates and fills in defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

pub const CONFIG_FILE_NAME: &str = "autotheme.toml";

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `autotheme.toml`, honouring `--config`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("autotheme").join(CONFIG_FILE_NAME))
}

/// Load configuration, creating a default file first if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration");
        log_indented!("{}", private_path(&config_path));
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], a missing file is an error here.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Fill every unset field with its default so the loaded config is explicit.
fn apply_defaults(config: &mut Config) {
    config.backend.get_or_insert(super::Backend::Auto);
    config.latitude.get_or_insert(DEFAULT_LATITUDE);
    config.longitude.get_or_insert(DEFAULT_LONGITUDE);
    config.poll_interval.get_or_insert(DEFAULT_POLL_INTERVAL);
    config
        .default_classification
        .get_or_insert(DEFAULT_CLASSIFICATION);
    config.start_at_login.get_or_insert(DEFAULT_START_AT_LOGIN);
    config
        .show_notifications
        .get_or_insert(DEFAULT_SHOW_NOTIFICATIONS);
    config
        .api_url
        .get_or_insert_with(|| DEFAULT_API_URL.to_string());
    config.request_timeout.get_or_insert(DEFAULT_REQUEST_TIMEOUT);
}
