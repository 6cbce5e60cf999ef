use procmon_core::{ProcmonError, ProcmonResult};
use rsfulmen::foundry::signals::{SIGKILL, SIGTERM};
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, HANDLE,
};
use windows_sys::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

/// Exit code handed to the terminated process.
const TERMINATED_EXIT_CODE: u32 = 1;

/// Process handle closed on drop, so every exit path releases it.
struct ProcessHandle(HANDLE);

impl ProcessHandle {
    fn open(pid: u32) -> ProcmonResult<Self> {
        let handle = unsafe { OpenProcess(PROCESS_TERMINATE, 0, pid) };
        if handle != 0 {
            return Ok(ProcessHandle(handle));
        }
        Err(match unsafe { GetLastError() } {
            ERROR_ACCESS_DENIED => ProcmonError::permission_denied(pid, "terminate"),
            // Returned for PIDs that do not (or no longer) exist.
            ERROR_INVALID_PARAMETER => ProcmonError::not_found(pid),
            code => ProcmonError::system("OpenProcess failed", code as i32),
        })
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

pub fn kill_impl(pid: u32, signal: i32) -> ProcmonResult<()> {
    // SIGTERM and SIGKILL both end in TerminateProcess.
    if signal != SIGTERM && signal != SIGKILL {
        return Err(ProcmonError::not_supported(
            format!("signal {signal}"),
            "windows",
        ));
    }

    let process = ProcessHandle::open(pid)?;
    if unsafe { TerminateProcess(process.0, TERMINATED_EXIT_CODE) } == 0 {
        let code = unsafe { GetLastError() };
        return Err(match code {
            ERROR_ACCESS_DENIED => ProcmonError::permission_denied(pid, "terminate"),
            _ => ProcmonError::system("TerminateProcess failed", code as i32),
        });
    }
    Ok(())
}
