//! Process signal handling for the daemon.
//!
//! SIGINT, SIGTERM and SIGHUP request shutdown; SIGUSR2 requests a config
//! reload. Everything is funnelled into one channel that the main loop waits
//! on, so the ticker, config watcher and signal thread share a single wake-up path.

use anyhow::Result;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};

/// Messages delivered to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Re-read `autotheme.toml` (SIGUSR2 or config file change).
    Reload,
    /// Stop the daemon (SIGINT, SIGTERM, SIGHUP).
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once shutdown has been requested.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned into the config watcher and IPC server.
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// Channel and running flag without any OS handlers attached.
    pub fn new() -> Self {
        let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Register OS signal handlers and return the shared state.
#[cfg(unix)]
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    use anyhow::Context;
    use signal_hook::{
        consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
        iterator::Signals,
    };

    let state = SignalState::new();
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                match sig {
                    SIGUSR2 => {
                        if sender.send(SignalMessage::Reload).is_err() {
                            break;
                        }
                        log_pipe!();
                        log_info!("Received configuration reload signal");
                    }
                    SIGINT | SIGTERM | SIGHUP => {
                        if debug_enabled {
                            log_pipe!();
                            log_debug!("Received shutdown signal ({sig})");
                        }
                        running.store(false, Ordering::SeqCst);
                        let _ = sender.send(SignalMessage::Shutdown);
                        break;
                    }
                    _ => {}
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(state)
}

/// Ctrl+C terminates the process directly on platforms without POSIX signals.
#[cfg(not(unix))]
pub fn setup_signal_handler(_debug_enabled: bool) -> Result<SignalState> {
    Ok(SignalState::new())
}
