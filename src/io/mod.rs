//! Process-level I/O: signals, the instance lock, autostart and notifications.

pub mod autostart;
pub mod lock;
pub mod notification;
pub mod signals;
