//! Windows implementation using Toolhelp32 and Win32 APIs
//!
//! Uses the following APIs:
//! - `CreateToolhelp32Snapshot` - enumerate all processes
//! - `Process32FirstW/NextW` - iterate process list
//! - `OpenProcess` / `GetProcessTimes` - CPU timing

use std::mem;

use procmon_core::{ProcmonError, ProcmonResult};
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, FILETIME,
    INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::System::Threading::{
    GetProcessTimes, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
};

use crate::{CpuTime, ProcessEntry};

// ============================================================================
// Implementation
// ============================================================================

pub fn enumerate_impl() -> ProcmonResult<Vec<ProcessEntry>> {
    let mut entries = Vec::new();

    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return Err(ProcmonError::internal(format!(
                "CreateToolhelp32Snapshot failed: {}",
                GetLastError()
            )));
        }

        let mut entry: PROCESSENTRY32W = mem::zeroed();
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

        if Process32FirstW(snapshot, &mut entry) != 0 {
            loop {
                entries.push(ProcessEntry {
                    pid: entry.th32ProcessID,
                    name: exe_name(&entry),
                });

                if Process32NextW(snapshot, &mut entry) == 0 {
                    break;
                }
            }
        }

        CloseHandle(snapshot);
    }

    Ok(entries)
}

pub fn cpu_time_impl(pid: u32) -> ProcmonResult<CpuTime> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle == 0 {
            let error = GetLastError();
            return match error {
                ERROR_ACCESS_DENIED => Err(ProcmonError::permission_denied(pid, "read cpu time")),
                ERROR_INVALID_PARAMETER => Err(ProcmonError::not_found(pid)),
                _ => Err(ProcmonError::system(
                    "OpenProcess failed".to_string(),
                    error as i32,
                )),
            };
        }

        let mut creation_time: FILETIME = mem::zeroed();
        let mut exit_time: FILETIME = mem::zeroed();
        let mut kernel_time: FILETIME = mem::zeroed();
        let mut user_time: FILETIME = mem::zeroed();

        let ok = GetProcessTimes(
            handle,
            &mut creation_time,
            &mut exit_time,
            &mut kernel_time,
            &mut user_time,
        ) != 0;
        let times_error = GetLastError();

        CloseHandle(handle);

        if !ok {
            return Err(ProcmonError::system(
                "GetProcessTimes failed".to_string(),
                times_error as i32,
            ));
        }

        // FILETIME is already in 100-nanosecond intervals.
        let total = filetime_units(&kernel_time).saturating_add(filetime_units(&user_time));
        Ok(CpuTime::from_units(total))
    }
}

fn filetime_units(ft: &FILETIME) -> u64 {
    (ft.dwHighDateTime as u64) << 32 | ft.dwLowDateTime as u64
}

/// Extract process name from szExeFile (null-terminated wide string).
fn exe_name(entry: &PROCESSENTRY32W) -> String {
    let end = entry
        .szExeFile
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(entry.szExeFile.len());
    String::from_utf16_lossy(&entry.szExeFile[..end])
}
