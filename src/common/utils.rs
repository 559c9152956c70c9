//! Shared helpers for paths, process checks and locking.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Scheduler state stays consistent across a panic because every mutation is a
/// single assignment, so the poisoned value is safe to keep using.
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read-lock counterpart of [`lock_or_recover`].
pub fn read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write-lock counterpart of [`lock_or_recover`].
pub fn write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Directory for the lock file and IPC socket.
///
/// Uses `$XDG_RUNTIME_DIR`, then `/run/user/<uid>` on unix, then the system temp dir.
pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    #[cfg(unix)]
    {
        let uid = nix::unistd::getuid();
        let candidate = PathBuf::from(format!("/run/user/{uid}"));
        if candidate.is_dir() {
            return candidate;
        }
    }

    std::env::temp_dir()
}

/// Check whether a process with `pid` is alive.
#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Signal 0 performs the permission and existence checks only.
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_process_running(pid: u32) -> bool {
    std::process::Command::new("tasklist")
        .args(["/FI", &format!("PID eq {pid}"), "/NH"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

/// Ask a process to terminate. Returns `true` when the request was delivered.
#[cfg(unix)]
pub fn terminate_process(pid: u32) -> bool {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    kill(Pid::from_raw(raw), Signal::SIGTERM).is_ok()
}

#[cfg(not(unix))]
pub fn terminate_process(pid: u32) -> bool {
    std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Format coordinates as `40.063°N, 88.246°W`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let lat_dir = if latitude >= 0.0 { "N" } else { "S" };
    let lon_dir = if longitude >= 0.0 { "E" } else { "W" };
    format!(
        "{:.3}°{}, {:.3}°{}",
        latitude.abs(),
        lat_dir,
        longitude.abs(),
        lon_dir
    )
}

/// Check whether an executable is reachable through `PATH`.
pub fn command_exists(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_format_coordinates_hemispheres() {
        assert_eq!(format_coordinates(40.063163, -88.245596), "40.063°N, 88.246°W");
        assert_eq!(format_coordinates(-33.8688, 151.2093), "33.869°S, 151.209°E");
    }

    #[test]
    fn test_lock_or_recover_poisoned() {
        let mutex = std::sync::Arc::new(Mutex::new(5));
        let clone = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock_or_recover(&mutex), 5);
    }

    #[test]
    fn test_rwlock_recovers_after_poisoning_writer() {
        let lock = std::sync::Arc::new(RwLock::new(5));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let mut guard = clone.write().unwrap();
            *guard = 6;
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        assert_eq!(*read_or_recover(&lock), 6);
        *write_or_recover(&lock) = 7;
        assert_eq!(*read_or_recover(&lock), 7);
    }

    #[test]
    #[serial]
    fn test_runtime_dir_prefers_xdg() {
        let original = std::env::var("XDG_RUNTIME_DIR").ok();
        unsafe {
            std::env::set_var("XDG_RUNTIME_DIR", "/tmp/autotheme-runtime-test");
        }

        let dir = runtime_dir();

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_RUNTIME_DIR", val),
                None => std::env::remove_var("XDG_RUNTIME_DIR"),
            }
        }

        assert_eq!(dir, PathBuf::from("/tmp/autotheme-runtime-test"));
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }
}
