//! Time source abstraction for real and simulated clocks.
//!
//! The scheduler reads "now" only through [`TimeSource`], which lets tests drive
//! it across sunrise and sunset without waiting. Each scheduler receives its own
//! source as an `Arc<dyn TimeSource>`.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use crate::common::utils::lock_or_recover;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current local time
    fn now(&self) -> DateTime<Local>;
}

/// Real-time implementation that uses the system clock
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fast-forward clock for tests.
///
/// Time only moves when [`advance`](Self::advance) or [`set`](Self::set) is called.
pub struct SimulatedTimeSource {
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: StdDuration) {
        let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero());
        let mut current = lock_or_recover(&self.current);
        *current += step;
    }

    /// Jump to an absolute instant, forwards or backwards.
    pub fn set(&self, instant: DateTime<Local>) {
        *lock_or_recover(&self.current) = instant;
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *lock_or_recover(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_simulated_advance_moves_only_on_request() {
        let clock = SimulatedTimeSource::new(noon());
        assert_eq!(clock.now(), noon());

        clock.advance(StdDuration::from_secs(3600));

        assert_eq!(clock.now(), noon() + ChronoDuration::hours(1));
    }

    #[test]
    fn test_simulated_set_can_move_backwards() {
        let clock = SimulatedTimeSource::new(noon());
        clock.set(noon() - ChronoDuration::days(1));
        assert_eq!(clock.now(), noon() - ChronoDuration::days(1));
    }

    #[test]
    fn test_real_time_source_follows_system_clock() {
        let clock = RealTimeSource;
        let before = Local::now();
        assert!(clock.now() >= before);
    }
}
