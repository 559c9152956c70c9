//! Sources of sunrise/sunset windows.
//!
//! The scheduler only depends on [`TimeWindowProvider`]; the HTTP client for
//! sunrise-sunset.org is the implementation used in production.

pub mod sunrise_sunset;

use chrono::NaiveDate;

use crate::core::window::{DayWindow, Location, WindowError};

pub use sunrise_sunset::SunriseSunsetProvider;

/// Why a window could not be obtained for this tick.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("provider reported status '{0}'")]
    RemoteStatus(String),
    #[error("provider returned an invalid window: {0}")]
    InvalidWindow(#[from] WindowError),
}

/// Returns the day window for a location and local calendar date.
///
/// Implementations must be safe to call repeatedly and must not retry internally.
#[cfg_attr(test, mockall::automock)]
pub trait TimeWindowProvider: Send + Sync {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<DayWindow, FetchError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "provider"
    }
}
