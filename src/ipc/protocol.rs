//! Wire format for commands sent to the running daemon.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! → {"command":"force_night"}
//! ← {"ok":true,"message":"Switched to Night theme","status":{...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::core::classification::Classification;
use crate::core::scheduler::{SchedulerStatus, ThemeScheduler, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    Check,
    ForceDay,
    ForceNight,
    Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    pub ok: bool,
    pub message: String,
    #[serde(default)]
    pub status: Option<SchedulerStatus>,
}

impl IpcResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            status: None,
        }
    }
}

/// Run a request against the scheduler and build the reply.
pub fn handle_request(scheduler: &ThemeScheduler, request: IpcRequest) -> IpcResponse {
    let (ok, message) = match request {
        IpcRequest::Check => describe_outcome(&scheduler.check_now()),
        IpcRequest::ForceDay => force(scheduler, Classification::Day),
        IpcRequest::ForceNight => force(scheduler, Classification::Night),
        IpcRequest::Status => (true, "Running".to_string()),
    };

    IpcResponse {
        ok,
        message,
        status: Some(scheduler.status()),
    }
}

fn force(scheduler: &ThemeScheduler, classification: Classification) -> (bool, String) {
    match scheduler.force(classification) {
        Ok(()) => (true, format!("Switched to {classification} theme")),
        Err(e) => (false, format!("Failed to apply {classification} theme: {e}")),
    }
}

/// Success flag and user-facing message for a tick result.
pub fn describe_outcome(outcome: &TickOutcome) -> (bool, String) {
    match outcome {
        TickOutcome::Skipped => (
            true,
            "A check is already in progress".to_string(),
        ),
        TickOutcome::Superseded => (
            true,
            "Check discarded: a theme was forced while it ran".to_string(),
        ),
        TickOutcome::Unknown => (
            false,
            "No sunrise/sunset data for today; nothing applied".to_string(),
        ),
        TickOutcome::Unchanged(c) => (true, format!("Already {c}; nothing to do")),
        TickOutcome::Applied { to, .. } => (true, format!("Switched to {to} theme")),
        TickOutcome::ApplyFailed { to, error, .. } => {
            (false, format!("Failed to apply {to} theme: {error}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        assert_eq!(
            serde_json::to_string(&IpcRequest::ForceNight).unwrap(),
            r#"{"command":"force_night"}"#
        );
        let parsed: IpcRequest = serde_json::from_str(r#"{"command":"check"}"#).unwrap();
        assert_eq!(parsed, IpcRequest::Check);
        assert!(serde_json::from_str::<IpcRequest>(r#"{"command":"reboot"}"#).is_err());
    }

    #[test]
    fn test_error_response_has_no_status() {
        let json = serde_json::to_string(&IpcResponse::error("bad request")).unwrap();
        let parsed: IpcResponse = serde_json::from_str(&json).unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.status, None);
    }

    #[test]
    fn test_describe_outcome() {
        assert!(!describe_outcome(&TickOutcome::Unknown).0);
        assert_eq!(
            describe_outcome(&TickOutcome::Applied {
                from: None,
                to: Classification::Night
            }),
            (true, "Switched to Night theme".to_string())
        );
    }
}
