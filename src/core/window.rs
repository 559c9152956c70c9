//! Location and day-window types consumed by the classifier.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::{
    MAXIMUM_LATITUDE, MAXIMUM_LONGITUDE, MINIMUM_LATITUDE, MINIMUM_LONGITUDE,
};
use crate::common::utils::format_coordinates;
use crate::config::ConfigError;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location, rejecting coordinates outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
        let lat_ok = (MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude);
        let lon_ok = (MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude);
        if !lat_ok || !lon_ok {
            return Err(ConfigError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coordinates(self.latitude, self.longitude))
    }
}

/// Reasons a day window cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WindowError {
    #[error("day start {start} is not before day end {end}")]
    NotOrdered {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    #[error("{which} at {at} does not fall on {date}")]
    OffDate {
        which: &'static str,
        at: DateTime<Local>,
        date: NaiveDate,
    },
}

/// How much of a date is daylight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Daylight {
    /// Daylight is the half-open interval `[start, end)`.
    Between {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    /// The sun never sets.
    MidnightSun,
    /// The sun never rises.
    PolarNight,
}

/// Daylight for one local calendar date.
///
/// Instances are only created through the constructors below, so a
/// [`Daylight::Between`] window has `start < end` with both instants on
/// `for_date` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    daylight: Daylight,
    for_date: NaiveDate,
}

impl DayWindow {
    pub fn new(
        day_start: DateTime<Local>,
        day_end: DateTime<Local>,
        for_date: NaiveDate,
    ) -> Result<Self, WindowError> {
        if day_start >= day_end {
            return Err(WindowError::NotOrdered {
                start: day_start,
                end: day_end,
            });
        }
        for (which, at) in [("sunrise", day_start), ("sunset", day_end)] {
            if at.date_naive() != for_date {
                return Err(WindowError::OffDate {
                    which,
                    at,
                    date: for_date,
                });
            }
        }
        Ok(Self {
            daylight: Daylight::Between {
                start: day_start,
                end: day_end,
            },
            for_date,
        })
    }

    /// Daylight all day long.
    pub fn midnight_sun(for_date: NaiveDate) -> Self {
        Self {
            daylight: Daylight::MidnightSun,
            for_date,
        }
    }

    /// No daylight at all.
    pub fn polar_night(for_date: NaiveDate) -> Self {
        Self {
            daylight: Daylight::PolarNight,
            for_date,
        }
    }

    pub fn daylight(&self) -> Daylight {
        self.daylight
    }

    /// Sunrise, if the sun rises and sets on this date.
    pub fn day_start(&self) -> Option<DateTime<Local>> {
        match self.daylight {
            Daylight::Between { start, .. } => Some(start),
            Daylight::MidnightSun | Daylight::PolarNight => None,
        }
    }

    /// Sunset, if the sun rises and sets on this date.
    pub fn day_end(&self) -> Option<DateTime<Local>> {
        match self.daylight {
            Daylight::Between { end, .. } => Some(end),
            Daylight::MidnightSun | Daylight::PolarNight => None,
        }
    }

    pub fn for_date(&self) -> NaiveDate {
        self.for_date
    }

    /// A cached window may only classify instants on its own date.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.for_date == date
    }
}

impl fmt::Display for Daylight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Daylight::Between { start, end } => write!(
                f,
                "sunrise {} sunset {}",
                start.format("%H:%M:%S"),
                end.format("%H:%M:%S")
            ),
            Daylight::MidnightSun => f.write_str("midnight sun, no sunset"),
            Daylight::PolarNight => f.write_str("polar night, no sunrise"),
        }
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.for_date, self.daylight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn test_location_bounds_inclusive() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
        assert!(Location::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_location_rejects_out_of_range() {
        assert!(matches!(
            Location::new(90.5, 0.0),
            Err(ConfigError::InvalidLocation { .. })
        ));
        assert!(Location::new(0.0, -180.01).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_window_requires_start_before_end() {
        let err = DayWindow::new(at(21, 20, 0), at(21, 6, 0), june(21)).unwrap_err();
        assert!(matches!(err, WindowError::NotOrdered { .. }));

        let same = DayWindow::new(at(21, 6, 0), at(21, 6, 0), june(21));
        assert!(same.is_err());
    }

    #[test]
    fn test_window_rejects_instants_on_other_dates() {
        let err = DayWindow::new(at(21, 6, 0), at(22, 0, 30), june(21)).unwrap_err();
        assert!(matches!(err, WindowError::OffDate { which: "sunset", .. }));
    }

    #[test]
    fn test_polar_windows_have_no_sunrise_or_sunset() {
        let sun = DayWindow::midnight_sun(june(21));
        assert_eq!(sun.daylight(), Daylight::MidnightSun);
        assert_eq!(sun.day_start(), None);
        assert_eq!(sun.day_end(), None);
        assert!(sun.is_valid_on(june(21)));
        assert_eq!(sun.to_string(), "2025-06-21 midnight sun, no sunset");

        let dark = DayWindow::polar_night(june(21));
        assert_eq!(dark.daylight(), Daylight::PolarNight);
        assert!(!dark.is_valid_on(june(22)));
    }

    #[test]
    fn test_window_validity_is_per_date() {
        let window = DayWindow::new(at(21, 6, 0), at(21, 20, 0), june(21)).unwrap();
        assert!(window.is_valid_on(june(21)));
        assert!(!window.is_valid_on(june(22)));
        assert!(!window.is_valid_on(june(20)));
    }
}
