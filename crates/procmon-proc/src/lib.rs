//! procmon-proc: Process enumeration and CPU usage estimation
//!
//! This crate provides the capabilities the monitor samples from, plus the
//! estimator that turns successive samples into CPU percentages.
//!
//! ## Features
//!
//! - **Process enumeration**: List live PIDs and display names
//! - **CPU-time counters**: Cumulative kernel + user time per process, in 100 ns units
//! - **Clock**: Wrapping millisecond tick and logical core count
//! - **Estimation**: Pure delta-based CPU percentage over rolling state ([`sampler`])
//!
//! ## Platform Support
//!
//! | Feature | Linux | macOS | Windows |
//! |---------|-------|-------|---------|
//! | PID enumeration | /proc | proc_listpids | Toolhelp32 |
//! | Process name | /proc/[pid]/comm | proc_name | szExeFile |
//! | CPU time | /proc/[pid]/stat | proc_pidinfo | GetProcessTimes |
//! | Core count | sysconf | sysconf | GetSystemInfo |
//!
//! ## Example
//!
//! ```rust,no_run
//! use procmon_proc::{estimate, ProcessSource, SampleState, SystemClock, SystemProcesses, Clock};
//!
//! let source = SystemProcesses;
//! let clock = SystemClock::new();
//! let baseline = SampleState::empty(clock.now_tick());
//! let readings = source.read_all().unwrap();
//! let (samples, state) = estimate(&baseline, readings, clock.now_tick(), clock.core_count());
//! println!("{} processes, {} tracked", samples.len(), state.len());
//! ```

use procmon_core::schema::SAMPLED_SNAPSHOT_V1;
use procmon_core::tick::CPU_UNITS_PER_SEC;
use procmon_core::{get_platform, ProcmonError, ProcmonResult};
use serde::Serialize;

// Platform-specific implementations
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform;
#[cfg(target_os = "macos")]
use macos as platform;
#[cfg(windows)]
use windows as platform;

pub mod clock;
pub mod sampler;

pub use clock::{Clock, SystemClock};
pub use sampler::{estimate, ProcessSample, SampleState};

// ============================================================================
// Types
// ============================================================================

/// Cumulative kernel + user CPU time of a process, in 100 ns units.
///
/// Monotonically non-decreasing for the life of one process. A smaller value
/// under the same PID means the PID was reused (or the counter is bogus).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CpuTime(u64);

impl CpuTime {
    /// Wrap a raw count of 100 ns units.
    pub const fn from_units(units: u64) -> Self {
        CpuTime(units)
    }

    /// Convert from nanoseconds (truncating to 100 ns resolution).
    pub const fn from_nanos(nanos: u64) -> Self {
        CpuTime(nanos / 100)
    }

    /// Convert from clock ticks at `hz` ticks per second (Linux `USER_HZ`).
    pub fn from_clock_ticks(ticks: u64, hz: u64) -> Self {
        let hz = hz.max(1);
        let units = u128::from(ticks) * u128::from(CPU_UNITS_PER_SEC) / u128::from(hz);
        CpuTime(u64::try_from(units).unwrap_or(u64::MAX))
    }

    /// Raw count of 100 ns units.
    pub const fn as_units(self) -> u64 {
        self.0
    }

    /// Units consumed since `earlier`, or 0 if the counter went backwards.
    pub fn delta_since(self, earlier: CpuTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// A process as seen by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Process ID. Unique at one instant, reusable after exit.
    pub pid: u32,

    /// Executable name as reported by the platform.
    pub name: String,
}

/// An enumerated process plus its CPU-time counter, if it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReading {
    pub pid: u32,
    pub name: String,
    /// `None` when the counter was unreadable this cycle (permissions, exit).
    pub cpu_time: Option<CpuTime>,
}

impl ProcessReading {
    pub fn new(entry: ProcessEntry, cpu_time: Option<CpuTime>) -> Self {
        ProcessReading {
            pid: entry.pid,
            name: entry.name,
            cpu_time,
        }
    }
}

// ============================================================================
// Process Source
// ============================================================================

/// The OS capability the monitor samples from.
///
/// Both operations are best-effort. `enumerate` may omit processes the caller
/// cannot see; `cpu_time` failing for one PID is a normal outcome.
pub trait ProcessSource {
    /// List live processes in enumeration order.
    fn enumerate(&self) -> ProcmonResult<Vec<ProcessEntry>>;

    /// Read the cumulative CPU time of one process.
    fn cpu_time(&self, pid: u32) -> ProcmonResult<CpuTime>;

    /// Enumerate and read every counter, degrading unreadable ones to `None`.
    fn read_all(&self) -> ProcmonResult<Vec<ProcessReading>> {
        self.read_all_with(&mut |_: u32, _: &ProcmonError| {})
    }

    /// Like [`ProcessSource::read_all`], reporting each unreadable counter
    /// to `on_unreadable` before it is degraded to `None`.
    ///
    /// Only a failed enumeration is returned as an error.
    fn read_all_with(
        &self,
        on_unreadable: &mut dyn FnMut(u32, &ProcmonError),
    ) -> ProcmonResult<Vec<ProcessReading>> {
        Ok(self
            .enumerate()?
            .into_iter()
            .map(|entry| {
                let cpu_time = match self.cpu_time(entry.pid) {
                    Ok(time) => Some(time),
                    Err(err) => {
                        on_unreadable(entry.pid, &err);
                        None
                    }
                };
                ProcessReading::new(entry, cpu_time)
            })
            .collect())
    }
}

/// The host's processes, read through the platform APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessSource for SystemProcesses {
    fn enumerate(&self) -> ProcmonResult<Vec<ProcessEntry>> {
        enumerate()
    }

    fn cpu_time(&self, pid: u32) -> ProcmonResult<CpuTime> {
        cpu_time(pid)
    }
}

/// List live processes on this host.
///
/// Processes that vanish or cannot be inspected mid-enumeration are skipped.
/// Fails only when the enumeration primitive itself is unavailable.
pub fn enumerate() -> ProcmonResult<Vec<ProcessEntry>> {
    platform::enumerate_impl()
}

/// Get the cumulative kernel + user CPU time of a process.
///
/// # Errors
///
/// - `NotFound` if the process does not exist (or exited)
/// - `PermissionDenied` if the caller may not query it
pub fn cpu_time(pid: u32) -> ProcmonResult<CpuTime> {
    platform::cpu_time_impl(pid)
}

// ============================================================================
// JSON Output
// ============================================================================

/// One sampled cycle, as printed by `procmon --once --json`.
#[derive(Debug, Clone, Serialize)]
pub struct SampledSnapshot {
    /// Schema identifier for this output format.
    pub schema_id: &'static str,

    /// Timestamp when the cycle completed (RFC 3339).
    pub timestamp: String,

    /// Platform identifier.
    pub platform: &'static str,

    /// Wall-clock milliseconds the percentages are measured over.
    pub interval_ms: u32,

    /// Logical cores the percentages are normalized by.
    pub core_count: u32,

    /// Ranked samples.
    pub processes: Vec<ProcessSample>,
}

/// Wrap ranked samples in the versioned JSON envelope.
pub fn make_sampled_snapshot(
    processes: Vec<ProcessSample>,
    interval_ms: u32,
    core_count: u32,
) -> SampledSnapshot {
    SampledSnapshot {
        schema_id: SAMPLED_SNAPSHOT_V1,
        timestamp: current_timestamp(),
        platform: get_platform(),
        interval_ms,
        core_count,
        processes,
    }
}

/// Get current timestamp in ISO 8601 format.
fn current_timestamp() -> String {
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

// ============================================================================
// Tests
// ============================================================================
