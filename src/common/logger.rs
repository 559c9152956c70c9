//! Structured logging with box-drawing output and an optional log file.
//!
//! Console output uses the pipe-and-branch layout shared by every command:
//!
//! ```text
//! ┏ autotheme v0.3.0 ━━╸
//! ┃
//! ┣ Lock acquired, starting autotheme...
//! ┃   Location: 40.063°N, 88.246°W
//! ┣[INFO] Switched to Night theme
//! ╹
//! ```
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (spacer pipe, then `┣ message`).
//! - **`log_decorated!`** continues the current block (`┣ message`).
//! - **`log_indented!`** prints nested detail under the previous line (`┃   message`).
//! - **`log_pipe!`** inserts a lone `┃`, normally before a semantic message that
//!   starts its own block.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`** carry a
//!   coloured `[LEVEL]` tag.
//! - **`log_version!`** and **`log_end!`** frame a whole run.
//!
//! When file logging is active every line is routed to a background writer thread,
//! and still echoed to stdout if stdout is a terminal. Colour codes are stripped, each line gets a wall-clock timestamp,
//! and the file is cut back to its newest [`MAX_LOG_LINES`] lines once it grows past
//! [`MAX_LOG_BYTES`].

use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::common::constants::{MAX_LOG_BYTES, MAX_LOG_LINES};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

// Set when file logging starts and stdout is an interactive terminal
static ECHO_TO_TERMINAL: AtomicBool = AtomicBool::new(false);

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Line shapes understood by [`emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    Decorated,
    Indented,
    Pipe,
    BlockStart,
    Version,
    End,
    Info,
    Debug,
    Warning,
    WarningStandalone,
    Error,
    ErrorExit,
    Critical,
}

impl Lead {
    /// Render a message with this lead, including the trailing newline.
    pub fn render(self, message: &str) -> String {
        match self {
            Lead::Decorated => format!("┣ {message}\n"),
            Lead::Indented => format!("┃   {message}\n"),
            Lead::Pipe => "┃\n".to_string(),
            Lead::BlockStart => format!("┃\n┣ {message}\n"),
            Lead::Version => format!("┏ autotheme v{} ━━╸\n", env!("CARGO_PKG_VERSION")),
            Lead::End => "╹\n".to_string(),
            Lead::Info => format!("┣[\x1b[32mINFO\x1b[0m] {message}\n"),
            Lead::Debug => format!("┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
            Lead::Warning => format!("┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
            Lead::WarningStandalone => format!("[\x1b[33mWARNING\x1b[0m] {message}\n"),
            Lead::Error => format!("┣[\x1b[31mERROR\x1b[0m] {message}\n"),
            Lead::ErrorExit => format!("┃\n┗[\x1b[31mERROR\x1b[0m] {message}\n"),
            Lead::Critical => format!("┣[\x1b[31mCRITICAL\x1b[0m] {message}\n"),
        }
    }
}

/// Global switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all macro output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path`.
    ///
    /// Can only be called once per process; the returned guard flushes and joins
    /// the writer thread when dropped.
    pub fn start_file_logging(file_path: PathBuf) -> anyhow::Result<LoggerGuard> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory {}", parent.display())
            })?;
        }

        ECHO_TO_TERMINAL.store(std::io::stdout().is_terminal(), Ordering::SeqCst);

        let (tx, rx) = channel();
        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || run_log_writer(rx, file_path))
            .context("Failed to spawn log writer thread")?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }
}

/// Start file logging, or warn and carry on without it.
///
/// Logging trouble must not stop a command from doing its job.
pub fn start_file_logging_or_warn(file_path: anyhow::Result<PathBuf>) -> Option<LoggerGuard> {
    match file_path.and_then(Log::start_file_logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            crate::log_warning_standalone!("File logging disabled: {e:#}");
            None
        }
    }
}

/// Keeps the log writer thread alive; dropping it drains pending lines.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Drain the log channel into `path` until shutdown.
///
/// A failed write is reported once on stderr and the line is dropped; the
/// writer keeps going so a later write can succeed again.
fn run_log_writer(rx: Receiver<LogMessage>, path: PathBuf) {
    let mut failing = false;
    while let Ok(LogMessage::Formatted(text)) = rx.recv() {
        match append_to_log(&path, &text) {
            Ok(()) => failing = false,
            Err(e) if !failing => {
                failing = true;
                eprintln!("autotheme: cannot write log file {}: {e}", path.display());
            }
            Err(_) => {}
        }
    }
}

fn append_to_log(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    drop(file);
    enforce_size_limit(path, MAX_LOG_BYTES, MAX_LOG_LINES)
}

/// Default location of the log file.
pub fn default_log_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data_dir.join("autotheme").join("autotheme.log"))
}

/// Cut `path` down to its newest `keep_lines` lines once it exceeds `max_bytes`.
///
/// Falls back to deleting the file when it cannot be rewritten.
pub fn enforce_size_limit(path: &Path, max_bytes: u64, keep_lines: usize) -> std::io::Result<()> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Ok(()),
    };
    if size <= max_bytes {
        return Ok(());
    }

    let rewrite = || -> std::io::Result<()> {
        let content = fs::read_to_string(path)?;
        let lines: Vec<&str> = content.lines().collect();
        let skip = lines.len().saturating_sub(keep_lines);
        let mut kept = lines[skip..].join("\n");
        kept.push('\n');
        fs::write(path, kept)
    };

    if rewrite().is_err() {
        let _ = fs::remove_file(path);
    }
    Ok(())
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

fn timestamp_lines(text: &str) -> String {
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    text.lines()
        .map(|line| format!("[{stamp}] {line}\n"))
        .collect()
}

/// Render and route one log line. Used by the logging macros.
pub fn emit(lead: Lead, message: &str) {
    write_output(&lead.render(message));
}

/// Send already-rendered text to the log file, and to stdout when no file is
/// active or stdout is a terminal.
pub fn write_output(text: &str) {
    let file_active = match LOG_CHANNEL.get() {
        Some(tx) => {
            let clean = strip_ansi_codes(text);
            let _ = tx.send(LogMessage::Formatted(timestamp_lines(&clean)));
            true
        }
        None => false,
    };
    if echoes_to_stdout(file_active, ECHO_TO_TERMINAL.load(Ordering::SeqCst)) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

fn echoes_to_stdout(file_active: bool, stdout_is_terminal: bool) -> bool {
    !file_active || stdout_is_terminal
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($lead:ident, $($fmt:tt)+) => {{
        if $crate::common::logger::Log::is_enabled() {
            $crate::common::logger::emit(
                $crate::common::logger::Lead::$lead,
                &format!($($fmt)+),
            );
        }
    }};
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Decorated, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Decorated, "{}", $expr) };
}

/// Nested detail: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Indented, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Indented, "{}", $expr) };
}

/// A lone `┃` spacer.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_emit!(Pipe, "")
    };
}

/// Start a new block: spacer pipe followed by `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(BlockStart, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(BlockStart, "{}", $expr) };
}

/// Application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_emit!(Version, "")
    };
}

/// Final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_emit!(End, "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Info, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Info, "{}", $expr) };
}

#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Debug, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Debug, "{}", $expr) };
}

#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Warning, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Warning, "{}", $expr) };
}

/// Warning without the leading branch, for output outside a block.
#[macro_export]
macro_rules! log_warning_standalone {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(WarningStandalone, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(WarningStandalone, "{}", $expr) };
}

#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Error, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Error, "{}", $expr) };
}

/// Error that terminates the current flow: `┗[ERROR] message`.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(ErrorExit, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(ErrorExit, "{}", $expr) };
}

#[macro_export]
macro_rules! log_critical {
    ($fmt:literal $($arg:tt)*) => { $crate::__log_emit!(Critical, $fmt $($arg)*) };
    ($expr:expr) => { $crate::__log_emit!(Critical, "{}", $expr) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "┣[\x1b[33mWARNING\x1b[0m] careful";
        assert_eq!(strip_ansi_codes(colored), "┣[WARNING] careful");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }

    #[test]
    fn test_render_block_start_has_spacer() {
        assert_eq!(Lead::BlockStart.render("hello"), "┃\n┣ hello\n");
        assert_eq!(Lead::Indented.render("detail"), "┃   detail\n");
        assert_eq!(Lead::End.render("ignored"), "╹\n");
    }

    #[test]
    fn test_timestamp_lines_prefixes_every_line() {
        let stamped = timestamp_lines("┃\n┣ hello\n");
        let lines: Vec<&str> = stamped.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with('[')));
        assert!(lines[1].ends_with("] ┣ hello"));
    }

    #[test]
    fn test_size_limit_keeps_newest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.log");
        let content: String = (0..50).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, &content).unwrap();

        enforce_size_limit(&path, 10, 5).unwrap();

        let remaining = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = remaining.lines().collect();
        assert_eq!(lines, vec!["line 45", "line 46", "line 47", "line 48", "line 49"]);
    }

    #[test]
    fn test_size_limit_leaves_small_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.log");
        fs::write(&path, "one\ntwo\n").unwrap();

        enforce_size_limit(&path, 1024, 1).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_writer_recovers_after_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.log");
        // A directory in place of the log file makes the first write fail
        fs::create_dir(&path).unwrap();

        let (tx, rx) = channel();
        let writer = std::thread::spawn({
            let path = path.clone();
            move || run_log_writer(rx, path)
        });

        tx.send(LogMessage::Formatted("┣ lost line\n".to_string())).unwrap();
        // Wait for the failed attempt before clearing the way
        std::thread::sleep(std::time::Duration::from_millis(100));
        fs::remove_dir(&path).unwrap();
        tx.send(LogMessage::Formatted("┣ Transitioning from Day to Night\n".to_string()))
            .unwrap();
        tx.send(LogMessage::Shutdown).unwrap();
        writer.join().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Transitioning from Day to Night"));
    }

    #[test]
    fn test_writer_stops_when_senders_are_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotheme.log");
        let (tx, rx) = channel();
        tx.send(LogMessage::Formatted("┣ only line\n".to_string())).unwrap();
        drop(tx);

        run_log_writer(rx, path.clone());

        assert_eq!(fs::read_to_string(&path).unwrap(), "┣ only line\n");
    }

    #[test]
    fn test_unusable_log_path_only_warns() {
        Log::set_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let guard = start_file_logging_or_warn(Ok(blocker.join("autotheme.log")));
        assert!(guard.is_none());
        assert!(LOG_CHANNEL.get().is_none());

        let guard = start_file_logging_or_warn(Err(anyhow::anyhow!("no data directory")));
        assert!(guard.is_none());
    }

    #[test]
    fn test_terminal_still_sees_output_while_file_logging() {
        assert!(echoes_to_stdout(false, false));
        assert!(echoes_to_stdout(false, true));
        assert!(echoes_to_stdout(true, true));
        assert!(!echoes_to_stdout(true, false));
    }

    #[test]
    fn test_size_limit_ignores_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");
        assert!(enforce_size_limit(&path, 1, 1).is_ok());
    }
}
