use std::io;

use procmon_core::{ProcmonError, ProcmonResult};

pub fn kill_impl(pid: u32, signal: i32) -> ProcmonResult<()> {
    // Caller guarantees 0 < pid <= i32::MAX.
    if unsafe { libc::kill(pid as libc::pid_t, signal) } == 0 {
        return Ok(());
    }
    Err(classify(pid, signal, io::Error::last_os_error()))
}

/// Map a failed `kill(2)` onto the outcomes the operator sees.
fn classify(pid: u32, signal: i32, err: io::Error) -> ProcmonError {
    match err.raw_os_error() {
        Some(libc::ESRCH) => ProcmonError::not_found(pid),
        Some(libc::EPERM) => ProcmonError::permission_denied(pid, "terminate"),
        Some(libc::EINVAL) => ProcmonError::invalid_argument(format!("invalid signal: {signal}")),
        Some(errno) => ProcmonError::system(format!("kill({pid}, {signal}): {err}"), errno),
        None => ProcmonError::system(format!("kill({pid}, {signal}): {err}"), 0),
    }
}
