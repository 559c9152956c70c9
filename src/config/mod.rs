//! Configuration system for autotheme.
//!
//! Settings live in `autotheme.toml` under the user's configuration directory
//! (`$XDG_CONFIG_HOME/autotheme/` on Linux, `%APPDATA%\autotheme\` on Windows),
//! or in the directory passed with `--config`. A commented default file is
//! written on first start:
//!
//! ```toml
//! #[Backend]
//! backend = "auto"               # Theme backend: "auto", "gnome", "windows" or "dry-run"
//!
//! #[Location]
//! latitude = 40.063163           # Latitude in decimal degrees (-90 to 90)
//! longitude = -88.245596         # Longitude in decimal degrees (-180 to 180)
//!
//! #[Schedule]
//! poll_interval = 60             # Seconds between checks (10-3600)
//! default_classification = "day" # Reported before the first sunrise/sunset lookup
//!
//! #[Preferences]
//! start_at_login = true          # Kept in sync by 'autotheme install/uninstall'
//! show_notifications = true      # Desktop notification when the theme switches
//!
//! #[Provider]
//! api_url = "https://api.sunrise-sunset.org/json"
//! request_timeout = 10           # HTTP timeout in seconds (1-60)
//! ```
//!
//! Every field is optional in the file; missing values fall back to the
//! defaults in `common::constants`. Out-of-range coordinates are reported as
//! [`ConfigError::InvalidLocation`] and never applied.

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::core::classification::Classification;
use crate::core::window::Location;

// Re-export public API
pub use builder::{create_default_config, update_coordinates, update_start_at_login};
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Configuration problems that must be reported to the user rather than applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "invalid location ({latitude}, {longitude}): latitude must be between -90 and 90 \
         and longitude between -180 and 180 degrees"
    )]
    InvalidLocation { latitude: f64, longitude: f64 },
}

/// Theme backend selection.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Windows on Windows, GNOME when `gsettings` is available.
    Auto,
    /// `gsettings set org.gnome.desktop.interface color-scheme`.
    Gnome,
    /// `Personalize` registry values plus a settings broadcast.
    Windows,
    /// Log the intended change without touching the desktop.
    DryRun,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Gnome => "gnome",
            Backend::Windows => "windows",
            Backend::DryRun => "dry-run",
        }
    }
}

/// Settings loaded from `autotheme.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub backend: Option<Backend>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub poll_interval: Option<u64>, // seconds
    pub default_classification: Option<Classification>,
    pub start_at_login: Option<bool>,
    pub show_notifications: Option<bool>,
    pub api_url: Option<String>,
    pub request_timeout: Option<u64>, // seconds
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or(Backend::Auto)
    }

    /// Saved coordinates, validated.
    pub fn location(&self) -> Result<Location, ConfigError> {
        Location::new(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL))
    }

    pub fn default_classification(&self) -> Classification {
        self.default_classification
            .unwrap_or(DEFAULT_CLASSIFICATION)
    }

    pub fn start_at_login(&self) -> bool {
        self.start_at_login.unwrap_or(DEFAULT_START_AT_LOGIN)
    }

    pub fn show_notifications(&self) -> bool {
        self.show_notifications
            .unwrap_or(DEFAULT_SHOW_NOTIFICATIONS)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Print the effective settings as an indented block.
    pub fn log_config(&self, resolved_backend: Option<Backend>) {
        match get_custom_config_dir() {
            Some(dir) => log_block_start!("Loaded configuration from {}", private_path(&dir)),
            None => log_block_start!("Loaded default configuration"),
        }

        let backend = match (self.backend(), resolved_backend) {
            (Backend::Auto, Some(resolved)) => format!("auto ({})", resolved.as_str()),
            (backend, _) => backend.as_str().to_string(),
        };
        log_indented!("Backend: {backend}");

        match self.location() {
            Ok(location) => log_indented!("Location: {location}"),
            Err(e) => log_indented!("Location: {e}"),
        }
        log_indented!("Poll interval: {} seconds", self.poll_interval().as_secs());
        log_indented!(
            "Notifications: {}",
            if self.show_notifications() { "on" } else { "off" }
        );
        log_indented!(
            "Start at login: {}",
            if self.start_at_login() { "yes" } else { "no" }
        );
    }
}
