//! Command channel between CLI invocations and the running daemon.
//!
//! The socket transport is unix-only. On other platforms [`request`] reports
//! that no daemon is reachable and commands act directly instead.

pub mod protocol;

#[cfg(unix)]
pub mod client;
#[cfg(unix)]
pub mod server;

use anyhow::Result;
use std::path::PathBuf;

use crate::common::utils::runtime_dir;
pub use protocol::{IpcRequest, IpcResponse};

pub const SOCKET_FILE_NAME: &str = "autotheme.sock";

pub fn socket_path() -> PathBuf {
    runtime_dir().join(SOCKET_FILE_NAME)
}

/// Send `request` to the daemon. `Ok(None)` means no daemon is listening.
#[cfg(unix)]
pub fn request(request: IpcRequest) -> Result<Option<IpcResponse>> {
    let path = socket_path();
    if !client::is_listening(&path) {
        return Ok(None);
    }
    client::send_request_to(&path, request).map(Some)
}

#[cfg(not(unix))]
pub fn request(_request: IpcRequest) -> Result<Option<IpcResponse>> {
    Ok(None)
}
