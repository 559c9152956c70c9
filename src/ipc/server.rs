//! Unix socket server answering [`IpcRequest`]s from other autotheme processes.
//!
//! Requests are handled one at a time on the server thread; each one calls
//! straight into the shared scheduler, which serializes it against the main loop.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::protocol::{IpcRequest, IpcResponse, handle_request};
use crate::common::constants::IPC_TIMEOUT_SECS;
use crate::common::utils::private_path;
use crate::core::scheduler::ThemeScheduler;

const ACCEPT_POLL: Duration = Duration::from_millis(50);

pub struct IpcServer {
    socket_path: PathBuf,
    stop: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Bind `socket_path` and start serving on a background thread.
    pub fn start(
        socket_path: PathBuf,
        scheduler: Arc<ThemeScheduler>,
        debug_enabled: bool,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create socket directory: {}", private_path(parent))
            })?;
        }
        // Left over from a daemon that did not exit cleanly; we hold the instance lock
        if socket_path.exists() {
            std::fs::remove_file(&socket_path).with_context(|| {
                format!("Failed to remove existing socket: {}", private_path(&socket_path))
            })?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {}", private_path(&socket_path)))?;
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking mode")?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let thread_handle = thread::Builder::new()
            .name("ipc-server".to_string())
            .spawn(move || serve(listener, scheduler, thread_stop, debug_enabled))
            .context("Failed to spawn IPC server thread")?;

        if debug_enabled {
            log_pipe!();
            log_debug!("IPC server listening on {}", private_path(&socket_path));
        }

        Ok(Self {
            socket_path,
            stop,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

fn serve(
    listener: UnixListener,
    scheduler: Arc<ThemeScheduler>,
    stop: Arc<AtomicBool>,
    debug_enabled: bool,
) {
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                if let Err(e) = serve_client(stream, &scheduler, debug_enabled)
                    && debug_enabled
                {
                    log_debug!("IPC client error: {e:#}");
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                if debug_enabled {
                    log_debug!("Error accepting IPC connection: {e}");
                }
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

fn serve_client(stream: UnixStream, scheduler: &ThemeScheduler, debug_enabled: bool) -> Result<()> {
    stream
        .set_nonblocking(false)
        .context("Failed to set client stream to blocking mode")?;
    stream.set_read_timeout(Some(Duration::from_secs(IPC_TIMEOUT_SECS)))?;
    stream.set_write_timeout(Some(Duration::from_secs(IPC_TIMEOUT_SECS)))?;

    let mut writer = stream.try_clone().context("Failed to clone client stream")?;
    let mut line = String::new();
    BufReader::new(stream)
        .read_line(&mut line)
        .context("Failed to read IPC request")?;

    // Liveness probes connect and hang up without sending anything
    if line.trim().is_empty() {
        return Ok(());
    }

    let response = match serde_json::from_str::<IpcRequest>(line.trim()) {
        Ok(request) => {
            if debug_enabled {
                log_pipe!();
                log_debug!("IPC request: {request:?}");
            }
            handle_request(scheduler, request)
        }
        Err(e) => IpcResponse::error(format!("Invalid request: {e}")),
    };

    let mut json = serde_json::to_string(&response).context("Failed to serialize IPC response")?;
    json.push('\n');
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.flush())
        .context("Failed to write IPC response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classification::Classification;
    use crate::core::scheduler::SchedulerSettings;
    use crate::core::window::{DayWindow, Location};
    use crate::ipc::client::send_request_to;
    use crate::provider::MockTimeWindowProvider;
    use crate::theme::DryRunApplier;
    use crate::time::SimulatedTimeSource;
    use chrono::{Local, TimeZone};

    fn scheduler() -> Arc<ThemeScheduler> {
        let mut provider = MockTimeWindowProvider::new();
        provider.expect_fetch().returning(|_, date| {
            let start = Local
                .from_local_datetime(&date.and_hms_opt(6, 0, 0).unwrap())
                .earliest()
                .unwrap();
            let end = Local
                .from_local_datetime(&date.and_hms_opt(20, 0, 0).unwrap())
                .earliest()
                .unwrap();
            Ok(DayWindow::new(start, end, date)?)
        });
        provider.expect_name().return_const("mock");

        let noon = Local.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).earliest().unwrap();
        Arc::new(
            ThemeScheduler::new(
                Box::new(provider),
                Box::new(DryRunApplier::new()),
                SchedulerSettings::new(Location::new(40.0, -88.0).unwrap()),
            )
            .with_clock(Arc::new(SimulatedTimeSource::new(noon))),
        )
    }

    #[test]
    fn test_server_round_trip_and_cleanup() {
        crate::common::logger::Log::set_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.sock");
        let scheduler = scheduler();

        let server = IpcServer::start(path.clone(), scheduler.clone(), false).unwrap();
        assert!(path.exists());

        let response = send_request_to(&path, IpcRequest::ForceNight).unwrap();
        assert!(response.ok);
        assert_eq!(
            response.status.unwrap().classification,
            Some(Classification::Night)
        );

        let response = send_request_to(&path, IpcRequest::Check).unwrap();
        assert!(response.ok);
        assert_eq!(response.message, "Switched to Day theme");

        let response = send_request_to(&path, IpcRequest::Status).unwrap();
        let status = response.status.unwrap();
        assert_eq!(status.classification, Some(Classification::Day));
        assert!(status.window_current);

        drop(server);
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_request_gets_error_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.sock");
        let _server = IpcServer::start(path.clone(), scheduler(), false).unwrap();

        let mut stream = UnixStream::connect(&path).unwrap();
        stream.write_all(b"{\"command\":\"explode\"}\n").unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).unwrap();

        let response: IpcResponse = serde_json::from_str(line.trim()).unwrap();
        assert!(!response.ok);
        assert!(response.message.starts_with("Invalid request"));
    }
}
