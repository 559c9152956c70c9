//! Day/night classification and transition detection.
//!
//! Both functions are pure. The scheduler owns the only state they are
//! evaluated against.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::window::{DayWindow, Daylight};

/// Visual mode derived from the current time and day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Day,
    Night,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Day => "day",
            Classification::Night => "night",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Day => f.write_str("Day"),
            Classification::Night => f.write_str("Night"),
        }
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Classification::Day),
            "night" => Ok(Classification::Night),
            other => Err(format!("unknown classification '{other}' (expected day or night)")),
        }
    }
}

/// A change between two consecutive evaluations.
///
/// `from` is `None` on cold start, before anything has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Option<Classification>,
    pub to: Classification,
}

/// Day iff `day_start <= now < day_end`; all day under the midnight sun and
/// never during polar night.
pub fn classify(now: DateTime<Local>, window: &DayWindow) -> Classification {
    match window.daylight() {
        Daylight::Between { start, end } if start <= now && now < end => Classification::Day,
        Daylight::Between { .. } | Daylight::PolarNight => Classification::Night,
        Daylight::MidnightSun => Classification::Day,
    }
}

/// Classify against an optional cached window.
///
/// Returns `None` (unknown) when there is no window or the window belongs to a
/// different date than `now`.
pub fn classify_current(now: DateTime<Local>, window: Option<&DayWindow>) -> Option<Classification> {
    window
        .filter(|w| w.is_valid_on(now.date_naive()))
        .map(|w| classify(now, w))
}

/// Emit a transition only when the classification changed.
pub fn detect_transition(
    previous: Option<Classification>,
    current: Classification,
) -> Option<Transition> {
    match previous {
        Some(prev) if prev == current => None,
        _ => Some(Transition {
            from: previous,
            to: current,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn window() -> DayWindow {
        DayWindow::new(
            Local.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap(),
            Local.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
        .unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_boundaries() {
        let w = window();
        assert_eq!(classify(at(5, 59), &w), Classification::Night);
        assert_eq!(classify(at(6, 0), &w), Classification::Day);
        assert_eq!(classify(at(19, 59), &w), Classification::Day);
        assert_eq!(classify(at(20, 0), &w), Classification::Night);
    }

    #[test]
    fn test_one_nanosecond_before_sunset_is_day() {
        let w = window();
        let just_before = w.day_end().unwrap() - Duration::nanoseconds(1);
        assert_eq!(classify(just_before, &w), Classification::Day);
    }

    #[test]
    fn test_polar_dates_classify_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let sun = DayWindow::midnight_sun(date);
        let dark = DayWindow::polar_night(date);
        for (hour, minute) in [(0, 0), (6, 0), (12, 0), (23, 59)] {
            assert_eq!(classify(at(hour, minute), &sun), Classification::Day);
            assert_eq!(classify(at(hour, minute), &dark), Classification::Night);
        }
        assert_eq!(
            classify_current(at(12, 0) + Duration::days(1), Some(&sun)),
            None
        );
    }

    #[test]
    fn test_stale_window_is_unknown() {
        let w = window();
        let next_day_noon = at(12, 0) + Duration::days(1);
        assert_eq!(classify_current(next_day_noon, Some(&w)), None);
        assert_eq!(classify_current(at(12, 0), None), None);
        assert_eq!(
            classify_current(at(12, 0), Some(&w)),
            Some(Classification::Day)
        );
    }

    #[test]
    fn test_detect_transition() {
        use Classification::*;
        assert_eq!(
            detect_transition(None, Night),
            Some(Transition {
                from: None,
                to: Night
            })
        );
        assert_eq!(detect_transition(Some(Day), Day), None);
        assert_eq!(
            detect_transition(Some(Day), Night),
            Some(Transition {
                from: Some(Day),
                to: Night
            })
        );
    }

    #[test]
    fn test_parse_classification() {
        assert_eq!("Day".parse::<Classification>(), Ok(Classification::Day));
        assert_eq!(" night ".parse::<Classification>(), Ok(Classification::Night));
        assert!("dusk".parse::<Classification>().is_err());
    }
}
