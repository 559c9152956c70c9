//! Application-wide defaults and validation limits.

use crate::core::classification::Classification;

// Location
//
// Defaults to Urbana, Illinois until the user runs `autotheme set-location`.
pub const DEFAULT_LATITUDE: f64 = 40.063163;
pub const DEFAULT_LONGITUDE: f64 = -88.245596;
pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// Polling
pub const DEFAULT_POLL_INTERVAL: u64 = 60; // seconds
pub const MINIMUM_POLL_INTERVAL: u64 = 10;
pub const MAXIMUM_POLL_INTERVAL: u64 = 3600;

/// Classification reported before the first successful fetch.
///
/// Only used for display; the scheduler never applies a theme it has not
/// derived from a real day window.
pub const DEFAULT_CLASSIFICATION: Classification = Classification::Day;

// Provider
pub const DEFAULT_API_URL: &str = "https://api.sunrise-sunset.org/json";
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10; // seconds
pub const MINIMUM_REQUEST_TIMEOUT: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT: u64 = 60;

// Preferences
pub const DEFAULT_START_AT_LOGIN: bool = true;
pub const DEFAULT_SHOW_NOTIFICATIONS: bool = true;

// Windows theme broadcast
pub const BROADCAST_TIMEOUT_MS: u32 = 5000;

// Autostart
pub const AUTOSTART_DELAY_SECS: u32 = 10;

// Log file
pub const MAX_LOG_BYTES: u64 = 1024 * 1024;
pub const MAX_LOG_LINES: usize = 1000;

// IPC
pub const IPC_TIMEOUT_SECS: u64 = 15;

// Exit codes
pub const EXIT_FAILURE: i32 = 1;

#[cfg(test)]
pub mod test_constants {
    // Window used across scheduler scenarios: 06:00 to 20:00 local.
    pub const TEST_SUNRISE_HOUR: u32 = 6;
    pub const TEST_SUNSET_HOUR: u32 = 20;

    pub const TEST_LATITUDE: f64 = 40.7128;
    pub const TEST_LONGITUDE: f64 = -74.0060;
}
