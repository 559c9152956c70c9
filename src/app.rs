//! Daemon startup and resource management.
//!
//! `Autotheme::new(debug_enabled).run()` owns every long-lived resource of the
//! daemon: the instance lock, signal handling, the config watcher, the IPC
//! server and the main loop. Dropping them in reverse order on return releases
//! the socket and the lock.
//!
//! Startup order matters: the lock is taken before anything that can produce
//! side effects, and the IPC server only starts once the scheduler exists.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{self, Config};
use crate::core::scheduler::{SchedulerSettings, ThemeScheduler};
use crate::core::{Core, CoreParams};
use crate::io::lock::{self, LockError};
use crate::io::notification::DesktopNotifier;
use crate::io::signals::setup_signal_handler;
use crate::provider::sunrise_sunset::SunriseSunsetProvider;
use crate::theme::{self, detect_backend};

/// Builder for configuring and running the autotheme daemon.
pub struct Autotheme {
    debug_enabled: bool,
}

impl Autotheme {
    /// Create a runner for the daemon
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    /// Execute the daemon until a shutdown signal arrives.
    pub fn run(self) -> Result<()> {
        log_version!();
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled - showing per-tick details");
        }

        // Lock before anything else so a second instance changes nothing
        let lock = match lock::acquire_lock() {
            Ok(lock) => lock,
            Err(e @ LockError::AlreadyRunning { .. }) => {
                anyhow::bail!("{e}; use 'autotheme stop' to stop it")
            }
            Err(e) => return Err(e).context("Failed to acquire the instance lock"),
        };

        let config = Config::load().context("Configuration failed")?;
        let backend = detect_backend(&config)?;
        config.log_config(Some(backend));

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        if let Err(e) =
            config::start_config_watcher(signal_state.signal_sender.clone(), self.debug_enabled)
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {e}");
            log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
        }

        let scheduler = Arc::new(build_scheduler(&config, true)?);
        log_block_start!("Theme backend: {}", scheduler.applier_name());

        #[cfg(unix)]
        let _ipc_server = match crate::ipc::server::IpcServer::start(
            crate::ipc::socket_path(),
            scheduler.clone(),
            self.debug_enabled,
        ) {
            Ok(server) => Some(server),
            Err(e) => {
                log_pipe!();
                log_warning!("IPC server unavailable: {e:#}");
                log_indented!(
                    "Commands like 'autotheme check' will not reach this instance ({})",
                    crate::common::utils::private_path(&crate::ipc::socket_path())
                );
                None
            }
        };

        log_block_start!("Lock acquired, starting autotheme...");

        let core = Core::new(CoreParams {
            scheduler,
            config,
            signal_state,
            debug_enabled: self.debug_enabled,
            lock: Some(lock),
        });

        core.execute()
    }
}

/// Wire up a scheduler from the configuration: provider, applier and settings.
///
/// `notify` selects the desktop notifier; one-shot runs and direct commands pass
/// `false` unless the user asked for notifications.
pub fn build_scheduler(config: &Config, notify: bool) -> Result<ThemeScheduler> {
    let settings = SchedulerSettings::from_config(config)
        .context("Invalid location in configuration")?;
    let provider = SunriseSunsetProvider::from_config(config)
        .context("Failed to create the sunrise/sunset client")?;
    let applier = theme::create_applier(config)?;

    let scheduler = ThemeScheduler::new(Box::new(provider), applier, settings);
    if notify && settings.show_notifications {
        Ok(scheduler.with_notifier(Box::new(DesktopNotifier)))
    } else {
        Ok(scheduler)
    }
}
