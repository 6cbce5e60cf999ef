use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use clap::Parser;
use procmon_core::ProcmonError;
use procmon_proc::{make_sampled_snapshot, SystemClock, SystemProcesses};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

mod command;
mod render;
mod session;

use session::{Session, SessionConfig, SortOrder};

/// Interactive terminal process monitor.
///
/// Samples every process at a fixed interval, shows the busiest ones, and
/// accepts one command per refresh: sort toggle, terminate by PID, or quit.
#[derive(Parser, Debug)]
#[command(name = "procmon", version, about, long_about = None)]
struct Cli {
    /// The format for log output.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// The minimum log level to display.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: tracing::Level,

    /// Time between samples (e.g. "2s", "500ms", "1m").
    #[arg(long, value_name = "DURATION", default_value = "2s")]
    interval: String,

    /// Number of rows to display.
    #[arg(long, value_name = "N", default_value_t = 25)]
    top: usize,

    /// Initial sort order.
    #[arg(long, value_name = "ORDER", default_value = "cpu")]
    sort: SortArg,

    /// Take one sample, print it, and exit.
    #[arg(long)]
    once: bool,

    /// Emit the single sample as JSON.
    #[arg(long, requires = "once")]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    /// Highest CPU usage first.
    Cpu,
    /// Ascending process ID.
    Pid,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Cpu => SortOrder::Cpu,
            SortArg::Pid => SortOrder::Pid,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Initialize the tracing subscriber
    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    info!("Initialization complete. Starting monitor.");
    match run(cli) {
        Ok(exit_code) => {
            info!("Monitor finished.");
            std::process::exit(exit_code);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, ProcmonError> {
    let interval = parse_duration(&cli.interval)?;
    if cli.top == 0 {
        return Err(ProcmonError::invalid_argument("top must be > 0"));
    }

    let stdout = io::stdout();
    let config = SessionConfig {
        interval,
        top: cli.top,
        clear_screen: !cli.once && stdout.is_terminal(),
    };
    info!(
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        top = config.top,
        once = cli.once,
        "monitor configured"
    );

    let mut session = Session::new(
        SystemProcesses,
        SystemClock::new(),
        procmon_signal::terminate,
        config,
        cli.sort.into(),
    );
    session.prime()?;
    info!(tracked = session.state().len(), "baseline sample taken");

    if cli.once {
        return run_once(&mut session, cli.json);
    }

    let stdin = io::stdin();
    session.run(stdin.lock(), stdout.lock())?;
    Ok(0)
}

fn run_once(
    session: &mut Session<SystemProcesses, SystemClock>,
    json: bool,
) -> Result<i32, ProcmonError> {
    let samples = session.sample();
    let mut out = io::stdout().lock();

    if json {
        let snapshot =
            make_sampled_snapshot(samples, session.last_elapsed_ms(), session.core_count());
        let text = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ProcmonError::internal(format!("JSON serialization failed: {e}")))?;
        writeln!(out, "{text}")?;
    } else {
        session.render(&mut out, &samples)?;
    }

    out.flush()?;
    Ok(0)
}

/// Parse a duration string like "5s", "100ms", "2m", "1h", or just "5" (seconds).
fn parse_duration(s: &str) -> Result<Duration, ProcmonError> {
    let s = s.trim();

    // Try to parse as plain number (seconds)
    if let Ok(secs) = s.parse::<f64>() {
        return seconds(secs, s);
    }

    // Try to parse with suffix
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600.0)
    } else {
        return Err(ProcmonError::invalid_argument(format!(
            "invalid duration '{s}': expected number or number with suffix (ms, s, m, h)"
        )));
    };

    let num: f64 = num_str.trim().parse().map_err(|_| {
        ProcmonError::invalid_argument(format!("invalid duration '{s}': not a valid number"))
    })?;

    seconds(num * multiplier, s)
}

fn seconds(secs: f64, raw: &str) -> Result<Duration, ProcmonError> {
    if secs < 0.0 {
        return Err(ProcmonError::invalid_argument(
            "duration cannot be negative",
        ));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ProcmonError::invalid_argument(format!("invalid duration '{raw}'")))
}
