//! macOS backend on top of libproc.
//!
//! PIDs come from `proc_listpids`, names from `proc_name`, and CPU time from
//! the `PROC_PIDTASKINFO` flavor of `proc_pidinfo`. Task times are reported in
//! Mach absolute-time units and scaled through `mach_timebase_info`.

use std::ffi::CStr;
use std::mem;
use std::sync::OnceLock;

use libc::{c_char, c_int, c_void, pid_t};
use procmon_core::{ProcmonError, ProcmonResult};

use crate::{CpuTime, ProcessEntry};

const PROC_ALL_PIDS: u32 = 1;
const PROC_PIDTASKINFO: c_int = 4;
/// `2 * MAXCOMLEN` plus the terminator, as libproc sizes it.
const NAME_BUF_LEN: usize = 2 * 16 + 1;
/// Headroom for processes spawned between the size probe and the fill.
const PID_SLACK: usize = 32;

/// `struct proc_taskinfo` from `<sys/proc_info.h>`. Only the time fields are read.
#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct TaskInfo {
    virtual_size: u64,
    resident_size: u64,
    total_user: u64,
    total_system: u64,
    threads_user: u64,
    threads_system: u64,
    policy: i32,
    faults: i32,
    pageins: i32,
    cow_faults: i32,
    messages_sent: i32,
    messages_received: i32,
    syscalls_mach: i32,
    syscalls_unix: i32,
    csw: i32,
    threadnum: i32,
    numrunning: i32,
    priority: i32,
}

#[repr(C)]
struct Timebase {
    numer: u32,
    denom: u32,
}

extern "C" {
    fn proc_listpids(kind: u32, typeinfo: u32, buffer: *mut c_void, size: c_int) -> c_int;
    fn proc_pidinfo(pid: c_int, flavor: c_int, arg: u64, buffer: *mut c_void, size: c_int)
        -> c_int;
    fn proc_name(pid: c_int, buffer: *mut c_void, size: u32) -> c_int;
    fn mach_timebase_info(info: *mut Timebase) -> c_int;
}

/// (numer, denom) for Mach ticks to nanoseconds. 1/1 on Intel, 125/3 on Apple Silicon.
fn timebase() -> (u64, u64) {
    static TIMEBASE: OnceLock<(u64, u64)> = OnceLock::new();
    *TIMEBASE.get_or_init(|| {
        let mut tb = Timebase { numer: 0, denom: 0 };
        let rc = unsafe { mach_timebase_info(&mut tb) };
        if rc != 0 || tb.numer == 0 || tb.denom == 0 {
            (1, 1)
        } else {
            (u64::from(tb.numer), u64::from(tb.denom))
        }
    })
}

fn mach_to_nanos(ticks: u64) -> u64 {
    let (numer, denom) = timebase();
    let nanos = u128::from(ticks) * u128::from(numer) / u128::from(denom);
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

pub fn enumerate_impl() -> ProcmonResult<Vec<ProcessEntry>> {
    Ok(pids()?
        .into_iter()
        .filter(|&pid| pid >= 0)
        .map(|pid| {
            let pid = pid as u32;
            ProcessEntry {
                pid,
                name: name_of(pid).unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect())
}

pub fn cpu_time_impl(pid: u32) -> ProcmonResult<CpuTime> {
    let info = task_info(pid)?;
    let ticks = info.total_user.saturating_add(info.total_system);
    Ok(CpuTime::from_nanos(mach_to_nanos(ticks)))
}

fn pids() -> ProcmonResult<Vec<pid_t>> {
    let probe = unsafe { proc_listpids(PROC_ALL_PIDS, 0, std::ptr::null_mut(), 0) };
    if probe <= 0 {
        return Err(ProcmonError::system(
            "proc_listpids size probe failed",
            last_errno(),
        ));
    }

    let slots = probe as usize / mem::size_of::<pid_t>() + PID_SLACK;
    let mut pids: Vec<pid_t> = vec![0; slots];
    let bytes = (slots * mem::size_of::<pid_t>()) as c_int;

    let filled = unsafe { proc_listpids(PROC_ALL_PIDS, 0, pids.as_mut_ptr().cast(), bytes) };
    if filled <= 0 {
        return Err(ProcmonError::system("proc_listpids failed", last_errno()));
    }

    pids.truncate(filled as usize / mem::size_of::<pid_t>());
    Ok(pids)
}

fn task_info(pid: u32) -> ProcmonResult<TaskInfo> {
    let mut info = TaskInfo::default();
    let size = mem::size_of::<TaskInfo>() as c_int;

    let written = unsafe {
        proc_pidinfo(
            pid as c_int,
            PROC_PIDTASKINFO,
            0,
            (&mut info as *mut TaskInfo).cast(),
            size,
        )
    };

    if written == size {
        return Ok(info);
    }
    match last_errno() {
        libc::EPERM | libc::EACCES => Err(ProcmonError::permission_denied(pid, "read cpu time")),
        _ => Err(ProcmonError::not_found(pid)),
    }
}

fn name_of(pid: u32) -> Option<String> {
    let mut buf = [0u8; NAME_BUF_LEN];
    let len = unsafe { proc_name(pid as c_int, buf.as_mut_ptr().cast(), buf.len() as u32) };
    if len <= 0 {
        return None;
    }

    let name = unsafe { CStr::from_ptr(buf.as_ptr() as *const c_char) };
    let name = name.to_string_lossy();
    (!name.is_empty()).then(|| name.into_owned())
}

fn last_errno() -> i32 {
    unsafe { *libc::__error() }
}
