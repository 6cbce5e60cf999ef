//! Linux implementation using /proc filesystem
//!
//! Reads process information from:
//! - `/proc` - numeric entries are live PIDs
//! - `/proc/[pid]/comm` - process name
//! - `/proc/[pid]/stat` - utime and stime in clock ticks

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use procmon_core::{ProcmonError, ProcmonResult};

use crate::{CpuTime, ProcessEntry};

// ============================================================================
// Implementation
// ============================================================================

pub fn enumerate_impl() -> ProcmonResult<Vec<ProcessEntry>> {
    let proc_dir = fs::read_dir("/proc")
        .map_err(|e| ProcmonError::internal(format!("Failed to read /proc: {}", e)))?;

    let mut entries = Vec::new();
    for entry in proc_dir.flatten() {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if !name_str.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let pid: u32 = match name_str.parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        // Exited between readdir and now.
        if let Some(name) = read_name(pid) {
            entries.push(ProcessEntry { pid, name });
        }
    }

    Ok(entries)
}

pub fn cpu_time_impl(pid: u32) -> ProcmonResult<CpuTime> {
    let path = Path::new("/proc").join(pid.to_string()).join("stat");
    let content = fs::read_to_string(&path).map_err(|e| map_io_error(e, pid))?;
    let (utime, stime) = parse_stat_times(&content)?;
    Ok(CpuTime::from_clock_ticks(
        utime.saturating_add(stime),
        clock_ticks(),
    ))
}

/// Name from `/proc/[pid]/comm`, falling back to the `stat` comm field.
fn read_name(pid: u32) -> Option<String> {
    let proc_path = Path::new("/proc").join(pid.to_string());
    if let Ok(comm) = fs::read_to_string(proc_path.join("comm")) {
        let comm = comm.trim_end_matches('\n');
        if !comm.is_empty() {
            return Some(comm.to_string());
        }
    }

    let stat = fs::read_to_string(proc_path.join("stat")).ok()?;
    parse_stat_comm(&stat)
}

/// Extract the comm field between the first '(' and the last ')'.
///
/// comm can itself contain spaces and parens.
fn parse_stat_comm(content: &str) -> Option<String> {
    let start = content.find('(')?;
    let end = content.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(content[start + 1..end].to_string())
}

/// Parse utime and stime (fields 14 and 15) from /proc/[pid]/stat.
///
/// Format: pid (comm) state ppid pgrp session tty_nr tpgid flags minflt cminflt
///         majflt cmajflt utime stime ...
fn parse_stat_times(content: &str) -> ProcmonResult<(u64, u64)> {
    let end_paren = content
        .rfind(')')
        .ok_or_else(|| ProcmonError::internal("Invalid stat format: no ')'"))?;

    let rest = content.get(end_paren + 1..).unwrap_or_default();
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() < 13 {
        return Err(ProcmonError::internal(
            "Invalid stat format: too few fields",
        ));
    }

    let utime = fields[11]
        .parse()
        .map_err(|_| ProcmonError::internal("Invalid stat format: bad utime"))?;
    let stime = fields[12]
        .parse()
        .map_err(|_| ProcmonError::internal("Invalid stat format: bad stime"))?;

    Ok((utime, stime))
}

fn map_io_error(e: io::Error, pid: u32) -> ProcmonError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => ProcmonError::permission_denied(pid, "read cpu time"),
        _ => ProcmonError::not_found(pid),
    }
}

/// Clock ticks per second (usually 100 on Linux).
///
/// Returns 100 as fallback if sysconf fails (returns -1).
fn clock_ticks() -> u64 {
    static CLOCK_TICKS: OnceLock<u64> = OnceLock::new();
    *CLOCK_TICKS.get_or_init(|| {
        let result = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if result <= 0 {
            100
        } else {
            result as u64
        }
    })
}
