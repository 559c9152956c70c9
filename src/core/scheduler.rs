//! The day/night state machine.
//!
//! [`ThemeScheduler`] owns the only [`SchedulerState`]. Every read-modify-write
//! happens under one mutex, which is released while the provider is queried and
//! re-taken to commit. Theme application runs with the lock held so a tick and a
//! force command never apply concurrently.
//!
//! Two mechanisms keep concurrent callers honest:
//!
//! - a single-flight guard: at most one fetch is outstanding, later ticks are
//!   reported as [`TickOutcome::Skipped`];
//! - a generation counter bumped by every force command: a tick that started
//!   before the force discards its classification instead of overwriting it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::common::constants::DEFAULT_CLASSIFICATION;
use crate::common::utils::{lock_or_recover, read_or_recover, write_or_recover};
use crate::config::{Config, ConfigError};
use crate::core::classification::{
    Classification, Transition, classify_current, detect_transition,
};
use crate::core::window::{DayWindow, Location};
use crate::io::notification::{Notifier, SilentNotifier, switch_message};
use crate::provider::TimeWindowProvider;
use crate::theme::{ApplyError, ThemeApplier};
use crate::time::{RealTimeSource, TimeSource};

/// Mutable scheduler state. Not persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerState {
    /// `None` until the first classification has been applied.
    pub last_classification: Option<Classification>,
    pub last_window: Option<DayWindow>,
    pub last_successful_fetch: Option<DateTime<Local>>,
    /// Bumped by force commands.
    pub generation: u64,
}

/// Settings the scheduler reads on every tick; replaced on config reload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    pub location: Location,
    pub default_classification: Classification,
    pub show_notifications: bool,
}

impl SchedulerSettings {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            default_classification: DEFAULT_CLASSIFICATION,
            show_notifications: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            location: config.location()?,
            default_classification: config.default_classification(),
            show_notifications: config.show_notifications(),
        })
    }
}

/// Result of one evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Another fetch was still in flight; nothing was done.
    Skipped,
    /// A force command arrived during the fetch; its classification was kept.
    Superseded,
    /// No window valid for today.
    Unknown,
    /// Classification matches what was last applied.
    Unchanged(Classification),
    Applied {
        from: Option<Classification>,
        to: Classification,
    },
    /// The applier failed. State still records `to`.
    ApplyFailed {
        from: Option<Classification>,
        to: Classification,
        error: String,
    },
}

/// Snapshot for `status` output and IPC responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub classification: Option<Classification>,
    /// `classification`, or the configured default before anything was applied.
    pub effective_classification: Classification,
    pub window: Option<DayWindow>,
    /// Whether `window` belongs to today.
    pub window_current: bool,
    pub last_successful_fetch: Option<DateTime<Local>>,
    pub location: Location,
    pub applier: String,
    pub fetch_in_flight: bool,
    pub generation: u64,
}

/// RAII claim on the single fetch slot.
struct FetchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FetchGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ThemeScheduler {
    state: Mutex<SchedulerState>,
    settings: RwLock<SchedulerSettings>,
    provider: Box<dyn TimeWindowProvider>,
    applier: Box<dyn ThemeApplier>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn TimeSource>,
    in_flight: AtomicBool,
}

impl ThemeScheduler {
    pub fn new(
        provider: Box<dyn TimeWindowProvider>,
        applier: Box<dyn ThemeApplier>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            state: Mutex::new(SchedulerState::default()),
            settings: RwLock::new(settings),
            provider,
            applier,
            notifier: Box::new(SilentNotifier),
            clock: Arc::new(RealTimeSource),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn settings(&self) -> SchedulerSettings {
        *read_or_recover(&self.settings)
    }

    /// One evaluation: fetch today's window, classify, apply on change.
    ///
    /// Never panics on provider or applier failure; both are logged and
    /// reflected in the returned outcome.
    pub fn tick(&self) -> TickOutcome {
        let Some(_guard) = FetchGuard::try_acquire(&self.in_flight) else {
            return TickOutcome::Skipped;
        };

        let generation = lock_or_recover(&self.state).generation;
        let location = self.settings().location;
        let today = self.clock.now().date_naive();

        // No lock held across the network call
        let fetched = self.provider.fetch(&location, today);

        let mut state = lock_or_recover(&self.state);
        match fetched {
            Ok(window) => {
                // A window for coordinates that changed mid-flight is useless
                if self.settings().location == location {
                    state.last_window = Some(window);
                    state.last_successful_fetch = Some(self.clock.now());
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Could not fetch sunrise/sunset from {}: {e}", self.provider.name());
                if state.last_window.is_some_and(|w| w.is_valid_on(today)) {
                    log_indented!("Using today's cached times");
                }
            }
        }

        if state.generation != generation {
            return TickOutcome::Superseded;
        }

        let Some(current) = classify_current(self.clock.now(), state.last_window.as_ref()) else {
            return TickOutcome::Unknown;
        };

        let Some(transition) = detect_transition(state.last_classification, current) else {
            return TickOutcome::Unchanged(current);
        };

        let outcome = self.apply_locked(&mut state, transition);
        drop(state);

        if let TickOutcome::Applied { from: Some(_), to } = outcome {
            self.notify_switch(to);
        }
        outcome
    }

    /// Out-of-band tick requested by the user. Same single-flight rule applies.
    pub fn check_now(&self) -> TickOutcome {
        self.tick()
    }

    pub fn force_day(&self) -> Result<(), ApplyError> {
        self.force(Classification::Day)
    }

    pub fn force_night(&self) -> Result<(), ApplyError> {
        self.force(Classification::Night)
    }

    /// Apply `classification` unconditionally and record it.
    ///
    /// Any fetch already in flight will not overwrite the forced state.
    pub fn force(&self, classification: Classification) -> Result<(), ApplyError> {
        let mut state = lock_or_recover(&self.state);
        state.generation = state.generation.wrapping_add(1);
        let previous = state.last_classification;

        log_block_start!("Forcing {classification} theme");
        let result = self.applier.apply(classification);
        state.last_classification = Some(classification);
        drop(state);

        match result {
            Ok(()) => {
                if previous != Some(classification) {
                    self.notify_switch(classification);
                }
                Ok(())
            }
            Err(e) => {
                log_error!("Failed to apply {classification} theme: {e}");
                Err(e)
            }
        }
    }

    /// Use new coordinates from the next tick on. The cached window is dropped.
    pub fn set_location(&self, location: Location) {
        let changed = {
            let mut settings = write_or_recover(&self.settings);
            let changed = settings.location != location;
            settings.location = location;
            changed
        };

        if changed {
            lock_or_recover(&self.state).last_window = None;
        }
    }

    /// Replace all settings, clearing the cached window if the location moved.
    pub fn apply_settings(&self, new_settings: SchedulerSettings) {
        self.set_location(new_settings.location);
        *write_or_recover(&self.settings) = new_settings;
    }

    /// Last applied classification, or the configured default.
    pub fn effective_classification(&self) -> Classification {
        lock_or_recover(&self.state)
            .last_classification
            .unwrap_or(self.settings().default_classification)
    }

    pub fn state(&self) -> SchedulerState {
        lock_or_recover(&self.state).clone()
    }

    pub fn status(&self) -> SchedulerStatus {
        let settings = self.settings();
        let state = lock_or_recover(&self.state).clone();
        let today = self.clock.now().date_naive();

        SchedulerStatus {
            classification: state.last_classification,
            effective_classification: state
                .last_classification
                .unwrap_or(settings.default_classification),
            window: state.last_window,
            window_current: state.last_window.is_some_and(|w| w.is_valid_on(today)),
            last_successful_fetch: state.last_successful_fetch,
            location: settings.location,
            applier: self.applier.name().to_string(),
            fetch_in_flight: self.in_flight.load(Ordering::Acquire),
            generation: state.generation,
        }
    }

    pub fn applier_name(&self) -> &'static str {
        self.applier.name()
    }

    /// What the desktop currently shows, according to the applier.
    pub fn describe_current(&self) -> Result<String, ApplyError> {
        self.applier.describe_current()
    }

    fn apply_locked(&self, state: &mut SchedulerState, transition: Transition) -> TickOutcome {
        let Transition { from, to } = transition;

        log_block_start!("{}", describe_transition(from, to));
        let result = self.applier.apply(to);
        // Recorded even on failure so a broken applier is not retried every tick
        state.last_classification = Some(to);

        match result {
            Ok(()) => TickOutcome::Applied { from, to },
            Err(e) => {
                log_error!("Failed to apply {to} theme: {e}");
                TickOutcome::ApplyFailed {
                    from,
                    to,
                    error: e.to_string(),
                }
            }
        }
    }

    fn notify_switch(&self, to: Classification) {
        if !self.settings().show_notifications {
            return;
        }
        let (summary, body) = switch_message(to);
        if let Err(e) = self.notifier.notify(summary, body) {
            log_indented!("Notification not shown: {e}");
        }
    }
}

fn describe_transition(from: Option<Classification>, to: Classification) -> String {
    match from {
        Some(from) => format!("Transitioning from {from} to {to}"),
        None => format!("Applying {to} theme"),
    }
}
