//! Fixed-cadence ticker for the main loop.
//!
//! Deadlines are `start + n * interval`, so time spent inside a tick does not
//! push later ticks back. A loop that overruns one or more deadlines resumes at
//! the next future deadline instead of firing the missed ones.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::io::signals::SignalMessage;

const MINIMUM_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerEvent {
    /// A deadline passed.
    Tick,
    /// A message arrived before the deadline.
    Message(SignalMessage),
    /// Every sender is gone.
    Disconnected,
}

#[derive(Debug)]
pub struct Ticker {
    start: Instant,
    interval: Duration,
    next: u64,
}

impl Ticker {
    /// First deadline is one interval from now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            start,
            interval: interval.max(MINIMUM_INTERVAL),
            next: 1,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the cadence, restarting the schedule from now.
    pub fn set_interval(&mut self, interval: Duration) {
        *self = Self::new(interval);
    }

    pub fn next_deadline(&self) -> Instant {
        self.start + offset(self.interval, self.next)
    }

    /// Block until the next deadline or an incoming message, whichever is first.
    pub fn wait(&mut self, receiver: &Receiver<SignalMessage>) -> TickerEvent {
        let deadline = self.next_deadline();
        let now = Instant::now();

        if now >= deadline {
            self.advance_past(now);
            return TickerEvent::Tick;
        }

        match receiver.recv_timeout(deadline - now) {
            Ok(message) => TickerEvent::Message(message),
            Err(RecvTimeoutError::Timeout) => {
                self.advance_past(Instant::now());
                TickerEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => TickerEvent::Disconnected,
        }
    }

    fn advance_past(&mut self, now: Instant) {
        self.next = next_tick_index(now.saturating_duration_since(self.start), self.interval);
    }
}

/// Index of the first deadline strictly after `elapsed`.
pub fn next_tick_index(elapsed: Duration, interval: Duration) -> u64 {
    let interval = interval.max(MINIMUM_INTERVAL).as_nanos();
    u64::try_from(elapsed.as_nanos() / interval)
        .unwrap_or(u64::MAX - 1)
        .saturating_add(1)
}

fn offset(interval: Duration, n: u64) -> Duration {
    interval.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}
