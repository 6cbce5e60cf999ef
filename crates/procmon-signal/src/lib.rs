//! procmon-signal: ending a process by PID.
//!
//! [`terminate`] is what the monitor's `k <pid>` command calls. It returns
//! `NotFound` and `PermissionDenied` as distinct errors so the operator sees
//! which one happened.
//!
//! PIDs are checked before any OS call. On Unix `kill(0, _)` targets the
//! caller's own process group and a PID above `i32::MAX` becomes negative as a
//! `pid_t` (`-1` means every process we may signal), so both are refused.

use procmon_core::{ProcmonError, ProcmonResult};

/// Largest PID that survives the cast to `pid_t`.
pub const MAX_SAFE_PID: u32 = i32::MAX as u32;

fn validate_pid(pid: u32) -> ProcmonResult<()> {
    if pid == 0 {
        return Err(ProcmonError::invalid_argument("pid must be > 0"));
    }
    if pid > MAX_SAFE_PID {
        return Err(ProcmonError::invalid_argument(format!(
            "pid {} exceeds maximum safe value {}",
            pid, MAX_SAFE_PID
        )));
    }
    Ok(())
}

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use rsfulmen::foundry::signals::{SIGKILL, SIGTERM};

/// Send a signal to a process.
///
/// On Windows only `SIGTERM` and `SIGKILL` are accepted; both terminate.
///
/// # Errors
///
/// - `InvalidArgument` for pid 0 or pid > [`MAX_SAFE_PID`]
/// - `NotFound` if no such process exists
/// - `PermissionDenied` if the caller may not signal it
pub fn kill(pid: u32, signal: i32) -> ProcmonResult<()> {
    validate_pid(pid)?;

    #[cfg(unix)]
    return unix::kill_impl(pid, signal);

    #[cfg(windows)]
    return windows::kill_impl(pid, signal);
}

/// Terminate a process: `SIGTERM` on Unix, `TerminateProcess` on Windows.
pub fn terminate(pid: u32) -> ProcmonResult<()> {
    kill(pid, SIGTERM)
}
