//! Lock file for single-instance enforcement.
//!
//! The daemon holds an exclusive `fs2` lock on `autotheme.lock` in the runtime
//! directory and writes its PID into it. Other commands read the PID to find
//! the running instance.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::utils::{self, runtime_dir};

pub const LOCK_FILE_NAME: &str = "autotheme.lock";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("autotheme is already running{}", .pid.map(|p| format!(" (PID: {p})")).unwrap_or_default())]
    AlreadyRunning { pid: Option<u32> },
    #[error("failed to access lock file: {0}")]
    Io(#[from] io::Error),
}

/// Held for the daemon's lifetime; unlocks and removes the file on drop.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn lock_path() -> PathBuf {
    runtime_dir().join(LOCK_FILE_NAME)
}

/// Acquire the instance lock at the default location.
pub fn acquire_lock() -> Result<LockFile, LockError> {
    acquire_lock_at(&lock_path())
}

/// Acquire the instance lock at `path`.
///
/// A lock left behind by a process that no longer exists is removed and the
/// acquisition retried once.
pub fn acquire_lock_at(path: &Path) -> Result<LockFile, LockError> {
    match try_lock(path)? {
        Some(lock) => Ok(lock),
        None => {
            let pid = read_lock_pid(path);
            if let Some(pid) = pid
                && !utils::is_process_running(pid)
            {
                log_warning!("Removing stale lock file (process {pid} no longer running)");
                let _ = std::fs::remove_file(path);
                if let Some(lock) = try_lock(path)? {
                    return Ok(lock);
                }
            }
            Err(LockError::AlreadyRunning { pid })
        }
    }
}

fn try_lock(path: &Path) -> io::Result<Option<LockFile>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Not truncated here: the holder's PID must stay readable until we own the lock
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(Some(LockFile {
        file,
        path: path.to_path_buf(),
    }))
}

/// PID recorded in the lock file, if it can be read.
pub fn read_lock_pid(path: &Path) -> Option<u32> {
    let mut content = String::new();
    File::open(path).ok()?.read_to_string(&mut content).ok()?;
    content.lines().next()?.trim().parse().ok()
}

/// PID of a live daemon, if one holds the lock.
pub fn running_instance() -> Option<u32> {
    let path = lock_path();
    let pid = read_lock_pid(&path)?;
    if pid != std::process::id() && utils::is_process_running(pid) {
        Some(pid)
    } else {
        None
    }
}
