//! Command-line command handlers for autotheme.
//!
//! Each command lives in its own submodule. Commands that talk to the daemon go
//! through [`crate::ipc::request`]; `day` and `night` fall back to applying the
//! theme directly when no daemon is reachable.

pub mod autostart;
pub mod help;
pub mod location;
pub mod manual;
pub mod once;
pub mod status;
pub mod stop;

use anyhow::Result;

use crate::ipc::IpcResponse;

/// Print the daemon's reply; a failed request becomes an error.
pub(crate) fn report_response(response: &IpcResponse) -> Result<()> {
    if !response.ok {
        anyhow::bail!("{}", response.message);
    }
    log_block_start!("{}", response.message);
    Ok(())
}
