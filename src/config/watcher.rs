//! Hot reload of `autotheme.toml`.
//!
//! The parent directory is watched non-recursively because editors (and our
//! own atomic writes) replace the file rather than modifying it in place.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::get_config_path;
use crate::common::utils::private_path;
use crate::io::signals::SignalMessage;

/// Editors often emit several events per save.
const DEBOUNCE_MS: u64 = 500;

/// Watches the config file and sends [`SignalMessage::Reload`] on change.
pub struct ConfigWatcher {
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
    config_path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(
        signal_sender: Sender<SignalMessage>,
        config_path: PathBuf,
        debug_enabled: bool,
    ) -> Self {
        Self {
            signal_sender,
            debug_enabled,
            config_path,
        }
    }

    /// Spawn the watcher thread. Returns once the watch is registered.
    pub fn start(self) -> Result<()> {
        let Some(config_dir) = self.config_path.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        if !config_dir.is_dir() {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Config directory missing, hot reload disabled");
            }
            return Ok(());
        }

        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&config_dir)))?;

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Watching {} for changes", private_path(&self.config_path));
        }

        let ConfigWatcher {
            signal_sender,
            debug_enabled,
            config_path,
        } = self;

        thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || {
                // The watcher stops when dropped
                let _watcher = watcher;
                let mut last_reload: Option<Instant> = None;

                for event in rx {
                    if !event
                        .paths
                        .iter()
                        .any(|path| is_config_event(path, &config_path))
                    {
                        continue;
                    }

                    if last_reload
                        .is_some_and(|at| at.elapsed() < Duration::from_millis(DEBOUNCE_MS))
                    {
                        continue;
                    }

                    if debug_enabled {
                        log_pipe!();
                        log_info!("Configuration file change detected");
                    }

                    if signal_sender.send(SignalMessage::Reload).is_err() {
                        break;
                    }
                    last_reload = Some(Instant::now());
                }
            })
            .context("Failed to spawn config watcher thread")?;

        Ok(())
    }
}

/// True when a filesystem event path refers to the watched config file.
pub(crate) fn is_config_event(event_path: &Path, config_path: &Path) -> bool {
    event_path.parent() == config_path.parent()
        && event_path.file_name().is_some()
        && event_path.file_name() == config_path.file_name()
}

/// Start watching the active config file for hot reload.
pub fn start_config_watcher(
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
) -> Result<()> {
    let config_path = get_config_path()?;
    ConfigWatcher::new(signal_sender, config_path, debug_enabled).start()
}
