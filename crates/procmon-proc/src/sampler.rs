//! Delta-based CPU usage estimation.
//!
//! A percentage is the CPU time a process consumed between two samples,
//! divided by the wall time between them times the number of logical cores.
//! The estimator is a pure function: it takes the previous [`SampleState`]
//! and the current readings, and hands back the samples plus the state to
//! carry into the next cycle.
//!
//! PIDs are only a weak key. A PID can be reused by an unrelated process
//! between samples, so a counter that went backwards counts as zero usage
//! instead of trusting the PID match.
//!
//! Normalizing by the total core count puts the steady-state ceiling at 100.
//! Counter jitter can push a single cycle slightly above it; no clamp is
//! applied on the upper side.

use std::collections::HashMap;

use procmon_core::tick::{elapsed_ticks, ticks_to_cpu_units, Tick};
use serde::Serialize;

use crate::{CpuTime, ProcessReading};

/// Rolling state carried between cycles.
///
/// Holds exactly the counters that were successfully read in the last cycle.
/// Processes that were not observed are absent; there is no separate sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleState {
    times: HashMap<u32, CpuTime>,
    tick: Tick,
}

impl SampleState {
    /// State with no counters, captured at `tick`.
    pub fn empty(tick: Tick) -> Self {
        SampleState {
            times: HashMap::new(),
            tick,
        }
    }

    /// Tick at which the counters were captured.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Counter recorded for `pid`, if it was read last cycle.
    pub fn get(&self, pid: u32) -> Option<CpuTime> {
        self.times.get(&pid).copied()
    }

    /// Whether `pid` had a readable counter last cycle.
    pub fn contains(&self, pid: u32) -> bool {
        self.times.contains_key(&pid)
    }

    /// Number of tracked processes.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True when no counters are tracked.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// One process with its estimated CPU usage for the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSample {
    /// Process ID.
    pub pid: u32,

    /// Executable name.
    pub name: String,

    /// Cumulative CPU time in 100 ns units; omitted when unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_time: Option<CpuTime>,

    /// Share of total host CPU since the previous cycle, 0-100.
    pub cpu_percent: f64,
}

/// Estimate CPU usage for `live` against `previous`.
///
/// Returns one sample per reading, in the order given, and the state for the
/// next cycle. `core_count` below 1 is treated as 1.
///
/// A reading gets 0% when:
/// - no wall time elapsed since `previous` was captured,
/// - its counter could not be read (it is also left out of the new state),
/// - its PID has no entry in `previous` (first observation),
/// - its counter is smaller than the previous one.
pub fn estimate(
    previous: &SampleState,
    live: Vec<ProcessReading>,
    now: Tick,
    core_count: u32,
) -> (Vec<ProcessSample>, SampleState) {
    let elapsed = elapsed_ticks(previous.tick, now);
    let cores = core_count.max(1);
    let capacity = ticks_to_cpu_units(elapsed) as f64 * f64::from(cores);

    let mut next = SampleState {
        times: HashMap::with_capacity(live.len()),
        tick: now,
    };

    let samples = live
        .into_iter()
        .map(|reading| {
            let cpu_percent = match reading.cpu_time {
                Some(current) => {
                    next.times.insert(reading.pid, current);
                    previous
                        .get(reading.pid)
                        .map(|prior| percent_of(current.delta_since(prior), capacity))
                        .unwrap_or(0.0)
                }
                None => 0.0,
            };

            ProcessSample {
                pid: reading.pid,
                name: reading.name,
                cpu_time: reading.cpu_time,
                cpu_percent,
            }
        })
        .collect();

    (samples, next)
}

fn percent_of(delta: u64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return 0.0;
    }
    let percent = delta as f64 / capacity * 100.0;
    if percent.is_finite() {
        percent.max(0.0)
    } else {
        0.0
    }
}
