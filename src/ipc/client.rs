//! Client side of the daemon socket.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::protocol::{IpcRequest, IpcResponse};
use crate::common::constants::IPC_TIMEOUT_SECS;
use crate::common::utils::private_path;

/// Send one request and wait for the reply.
pub fn send_request_to(socket_path: &Path, request: IpcRequest) -> Result<IpcResponse> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "Failed to connect to autotheme socket at {}. Is autotheme running?",
            private_path(socket_path)
        )
    })?;

    let timeout = Some(Duration::from_secs(IPC_TIMEOUT_SECS));
    stream
        .set_read_timeout(timeout)
        .context("Failed to set read timeout on IPC socket")?;
    stream.set_write_timeout(timeout)?;

    let mut json = serde_json::to_string(&request).context("Failed to serialize IPC request")?;
    json.push('\n');
    stream
        .write_all(json.as_bytes())
        .context("Failed to send IPC request")?;

    let mut line = String::new();
    BufReader::new(stream)
        .read_line(&mut line)
        .context("Failed to read IPC response")?;

    if line.trim().is_empty() {
        anyhow::bail!("Connection closed by autotheme without a response");
    }

    serde_json::from_str(line.trim())
        .with_context(|| format!("Failed to parse IPC response: {}", line.trim()))
}

/// Whether something is accepting connections on the socket.
pub fn is_listening(socket_path: &Path) -> bool {
    socket_path.exists() && UnixStream::connect(socket_path).is_ok()
}
