//! Core scheduling logic and the daemon's main loop.
//!
//! - [`window`]: locations and day windows
//! - [`classification`]: the day/night classifier and transition detector
//! - [`scheduler`]: the state machine behind ticks and manual commands
//! - [`ticker`]: the drift-free polling cadence
//!
//! [`Core`] ties them together: it ticks the scheduler on schedule, reacts to
//! reload and shutdown messages, and never exits because of a failed tick.

pub mod classification;
pub mod scheduler;
pub mod ticker;
pub mod window;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::io::lock::LockFile;
use crate::io::signals::{SignalMessage, SignalState};
use scheduler::{SchedulerSettings, ThemeScheduler, TickOutcome};
use ticker::{Ticker, TickerEvent};

/// Parameters for creating a Core instance.
pub(crate) struct CoreParams {
    pub scheduler: Arc<ThemeScheduler>,
    pub config: Config,
    pub signal_state: SignalState,
    pub debug_enabled: bool,
    pub lock: Option<LockFile>,
}

pub(crate) struct Core {
    scheduler: Arc<ThemeScheduler>,
    config: Config,
    signal_state: SignalState,
    ticker: Ticker,
    debug_enabled: bool,
    lock: Option<LockFile>,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        let ticker = Ticker::new(params.config.poll_interval());
        Self {
            scheduler: params.scheduler,
            config: params.config,
            signal_state: params.signal_state,
            ticker,
            debug_enabled: params.debug_enabled,
            lock: params.lock,
        }
    }

    /// Run until shutdown is requested.
    pub fn execute(mut self) -> Result<()> {
        if self.debug_enabled
            && let Some(lock) = &self.lock
        {
            log_pipe!();
            log_debug!(
                "Holding instance lock at {}",
                crate::common::utils::private_path(lock.path())
            );
        }

        // First evaluation happens immediately, not one interval in
        let outcome = self.scheduler.tick();
        report_tick_outcome(&outcome, self.debug_enabled);

        self.main_loop();

        log_block_start!("Shutting down autotheme...");
        drop(self.lock.take());
        log_end!();
        Ok(())
    }

    fn main_loop(&mut self) {
        while self.signal_state.is_running() {
            match self.ticker.wait(&self.signal_state.signal_receiver) {
                TickerEvent::Tick => {
                    let outcome = self.scheduler.tick();
                    report_tick_outcome(&outcome, self.debug_enabled);
                }
                TickerEvent::Message(SignalMessage::Reload) => self.reload(),
                TickerEvent::Message(SignalMessage::Shutdown) => break,
                TickerEvent::Disconnected => break,
            }
        }
    }

    /// Re-read the config file. An invalid file keeps the current settings.
    fn reload(&mut self) {
        let new_config = match config::load() {
            Ok(config) => config,
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload config: {e:#}");
                log_indented!("Continuing with previous configuration");
                return;
            }
        };

        let settings = match SchedulerSettings::from_config(&new_config) {
            Ok(settings) => settings,
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload config: {e}");
                log_indented!("Continuing with previous configuration");
                return;
            }
        };

        if new_config == self.config {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Configuration unchanged");
            }
            return;
        }

        if new_config.backend() != self.config.backend()
            || new_config.api_url() != self.config.api_url()
            || new_config.request_timeout() != self.config.request_timeout()
        {
            log_pipe!();
            log_warning!("Backend and provider changes take effect after a restart");
        }

        self.scheduler.apply_settings(settings);
        if new_config.poll_interval() != self.ticker.interval() {
            self.ticker.set_interval(new_config.poll_interval());
        }

        new_config.log_config(None);
        self.config = new_config;

        // New coordinates mean a new window: evaluate right away
        let outcome = self.scheduler.tick();
        report_tick_outcome(&outcome, self.debug_enabled);
    }
}

/// Log a tick result. Applied and failed transitions are already logged by the
/// scheduler; the rest are only shown with `--debug`.
pub(crate) fn report_tick_outcome(outcome: &TickOutcome, debug_enabled: bool) {
    if !debug_enabled {
        return;
    }
    match outcome {
        TickOutcome::Skipped => {
            log_pipe!();
            log_debug!("Tick skipped: a fetch is already in flight");
        }
        TickOutcome::Superseded => {
            log_pipe!();
            log_debug!("Tick result discarded: a forced theme was applied meanwhile");
        }
        TickOutcome::Unknown => {
            log_pipe!();
            log_debug!("No sunrise/sunset data for today yet");
        }
        TickOutcome::Unchanged(classification) => {
            log_pipe!();
            log_debug!("Still {classification}");
        }
        TickOutcome::Applied { .. } | TickOutcome::ApplyFailed { .. } => {}
    }
}
