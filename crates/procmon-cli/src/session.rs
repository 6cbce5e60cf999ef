//! The interactive sampling loop.
//!
//! A [`Session`] owns the rolling [`SampleState`] and threads it through
//! [`estimate`] once per cycle. Each cycle runs strictly in order: wait for
//! the interval, sample, render, read one command, act on it. Commands are
//! only ever handled between completed cycles.

use std::fmt;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use procmon_core::{elapsed_ticks, ProcmonError, ProcmonResult};
use procmon_proc::{estimate, Clock, ProcessReading, ProcessSample, ProcessSource, SampleState};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::render::{self, Frame};

/// Row ordering for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest CPU first; ties keep enumeration order.
    Cpu,
    /// Ascending PID.
    Pid,
}

impl SortOrder {
    /// The other order; what `s` switches to.
    pub fn toggle(self) -> SortOrder {
        match self {
            SortOrder::Cpu => SortOrder::Pid,
            SortOrder::Pid => SortOrder::Cpu,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Cpu => f.write_str("CPU"),
            SortOrder::Pid => f.write_str("PID"),
        }
    }
}

/// Sort samples in place. Both orders are stable.
pub fn rank(samples: &mut [ProcessSample], order: SortOrder) {
    match order {
        SortOrder::Cpu => samples.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent)),
        SortOrder::Pid => samples.sort_by_key(|s| s.pid),
    }
}

/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Pause before every sample.
    pub interval: Duration,
    /// Rows rendered per cycle.
    pub top: usize,
    /// Emit an ANSI clear before each table.
    pub clear_screen: bool,
}

/// Process termination capability.
pub type TerminateFn = fn(u32) -> ProcmonResult<()>;

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Resample,
    /// A report was printed; wait for Enter before resampling.
    Pause,
    Quit,
}

/// One monitoring session: the collaborators, the rolling state and the
/// current sort order.
pub struct Session<S, C> {
    source: S,
    clock: C,
    terminate: TerminateFn,
    config: SessionConfig,
    state: SampleState,
    sort: SortOrder,
    last_elapsed_ms: u32,
}

impl<S: ProcessSource, C: Clock> Session<S, C> {
    pub fn new(
        source: S,
        clock: C,
        terminate: TerminateFn,
        config: SessionConfig,
        sort: SortOrder,
    ) -> Self {
        let state = SampleState::empty(clock.now_tick());
        Session {
            source,
            clock,
            terminate,
            config,
            state,
            sort,
            last_elapsed_ms: 0,
        }
    }

    /// Counters carried into the next cycle.
    pub fn state(&self) -> &SampleState {
        &self.state
    }

    /// Wall time covered by the most recent [`Session::sample`].
    pub fn last_elapsed_ms(&self) -> u32 {
        self.last_elapsed_ms
    }

    pub fn core_count(&self) -> u32 {
        self.clock.core_count().max(1)
    }

    /// Capture the baseline counters.
    ///
    /// Unlike later cycles, an enumeration failure here is returned: with no
    /// working enumeration there is nothing to monitor.
    pub fn prime(&mut self) -> ProcmonResult<()> {
        let now = self.clock.now_tick();
        let readings = self.source.read_all()?;
        let (_, state) = estimate(&SampleState::empty(now), readings, now, self.core_count());
        self.state = state;
        debug!(tracked = self.state.len(), tick = now, "baseline captured");
        Ok(())
    }

    /// Wait one interval, then take and rank a sample.
    pub fn sample(&mut self) -> Vec<ProcessSample> {
        if !self.config.interval.is_zero() {
            thread::sleep(self.config.interval);
        }

        let now = self.clock.now_tick();
        let readings = self.collect();
        let cores = self.core_count();

        self.last_elapsed_ms = elapsed_ticks(self.state.tick(), now);
        let (mut samples, next) = estimate(&self.state, readings, now, cores);
        self.state = next;
        rank(&mut samples, self.sort);

        debug!(
            processes = samples.len(),
            tracked = self.state.len(),
            elapsed_ms = self.last_elapsed_ms,
            cores,
            "cycle sampled"
        );
        samples
    }

    fn collect(&self) -> Vec<ProcessReading> {
        let mut log_unreadable = |pid: u32, err: &ProcmonError| {
            debug!(pid, error = %err, "cpu time unreadable");
        };
        match self.source.read_all_with(&mut log_unreadable) {
            Ok(readings) => readings,
            Err(err) => {
                warn!(error = %err, "process enumeration failed; showing an empty table");
                Vec::new()
            }
        }
    }

    /// Render `samples` without the command prompt.
    pub fn render<W: Write>(&self, out: &mut W, samples: &[ProcessSample]) -> ProcmonResult<()> {
        let frame = Frame {
            interval: self.config.interval,
            sort: self.sort,
            total: samples.len(),
            top: self.config.top,
            clear_screen: self.config.clear_screen,
        };
        render::write_table(out, &frame, samples)?;
        Ok(())
    }

    /// Run cycles until the operator quits or input ends.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> ProcmonResult<()> {
        loop {
            let samples = self.sample();
            self.render(&mut out, &samples)?;
            render::write_prompt(&mut out)?;

            let Some(line) = read_line(&mut input)? else {
                info!("input closed");
                break;
            };

            match self.apply(Command::parse(&line), &mut out)? {
                Step::Resample => {}
                Step::Quit => break,
                Step::Pause => {
                    render::write_pause(&mut out)?;
                    if read_line(&mut input)?.is_none() {
                        info!("input closed");
                        break;
                    }
                }
            }
        }

        writeln!(out, "Exiting monitor.")?;
        out.flush()?;
        Ok(())
    }

    /// Act on one command. Never touches the rolling state.
    pub fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> ProcmonResult<Step> {
        match command {
            Command::Refresh => Ok(Step::Resample),
            Command::Quit => Ok(Step::Quit),
            Command::ToggleSort => {
                self.sort = self.sort.toggle();
                debug!(sort = %self.sort, "sort order changed");
                Ok(Step::Resample)
            }
            Command::Terminate(pid) => {
                self.report_terminate(pid, out)?;
                Ok(Step::Pause)
            }
            Command::InvalidPid(text) => {
                writeln!(out, "Invalid PID input: '{text}'")?;
                Ok(Step::Pause)
            }
            Command::Unknown(text) => {
                writeln!(out, "Unknown command: '{text}'")?;
                Ok(Step::Resample)
            }
        }
    }

    fn report_terminate<W: Write>(&self, pid: u32, out: &mut W) -> ProcmonResult<()> {
        match (self.terminate)(pid) {
            Ok(()) => {
                info!(pid, "process terminated");
                writeln!(out, "PID {pid} terminated.")?;
            }
            Err(ProcmonError::NotFound { .. }) => {
                warn!(pid, "terminate target not found");
                writeln!(out, "PID {pid} not found.")?;
            }
            Err(ProcmonError::PermissionDenied { .. }) => {
                warn!(pid, "terminate denied");
                writeln!(out, "Access denied terminating PID {pid}.")?;
            }
            Err(err) => {
                warn!(pid, error = %err, "terminate failed");
                writeln!(
                    out,
                    "Failed to terminate PID {pid}: {err} (code {})",
                    err.error_code()
                )?;
            }
        }
        Ok(())
    }
}

/// Read one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> ProcmonResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
