//! Table rendering for the interactive view.

use std::borrow::Cow;
use std::io::{self, Write};
use std::time::Duration;

use procmon_proc::ProcessSample;

use crate::session::SortOrder;

/// Longest name shown before truncation kicks in.
pub const NAME_WIDTH: usize = 38;

const ELLIPSIS: &str = "...";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Everything the header line needs to know about the current cycle.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub interval: Duration,
    pub sort: SortOrder,
    pub total: usize,
    pub top: usize,
    pub clear_screen: bool,
}

/// Draw one cycle: header, the first `frame.top` rows, and a blank line.
pub fn write_table<W: Write>(
    out: &mut W,
    frame: &Frame,
    samples: &[ProcessSample],
) -> io::Result<()> {
    if frame.clear_screen {
        write!(out, "{CLEAR_SCREEN}")?;
    }

    writeln!(
        out,
        "procmon  |  Refresh {}  |  Sort: {}  |  {} processes",
        format_interval(frame.interval),
        frame.sort,
        frame.total
    )?;
    writeln!(out, "{:<8}{:<40}{:>10}", "PID", "Process", "CPU(%)")?;
    writeln!(out, "{:-<58}", "")?;

    if samples.is_empty() {
        writeln!(out, "(no processes)")?;
    }

    for sample in samples.iter().take(frame.top) {
        writeln!(
            out,
            "{:<8}{:<40}{:>10.2}",
            sample.pid,
            truncate_name(&sample.name),
            sample.cpu_percent
        )?;
    }

    writeln!(out)
}

/// Command help and the input prompt. Flushes so the prompt is visible.
pub fn write_prompt<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands: (s)ort  (k)ill PID  (q)uit  (Enter) refresh")?;
    write!(out, "Enter: ")?;
    out.flush()
}

pub fn write_pause<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "Press Enter to continue...")?;
    out.flush()
}

/// Names longer than [`NAME_WIDTH`] characters keep their first 37 and end in `...`.
pub fn truncate_name(name: &str) -> Cow<'_, str> {
    if name.chars().count() <= NAME_WIDTH {
        return Cow::Borrowed(name);
    }
    let keep = NAME_WIDTH - 1;
    let mut short: String = name.chars().take(keep).collect();
    short.push_str(ELLIPSIS);
    Cow::Owned(short)
}

fn format_interval(interval: Duration) -> String {
    if interval.subsec_millis() == 0 {
        format!("{}s", interval.as_secs())
    } else {
        format!("{}ms", interval.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, name: &str, cpu: f64) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cpu_time: None,
            cpu_percent: cpu,
        }
    }

    fn frame(top: usize, total: usize) -> Frame {
        Frame {
            interval: Duration::from_secs(2),
            sort: SortOrder::Cpu,
            total,
            top,
            clear_screen: false,
        }
    }

    fn render(frame: &Frame, samples: &[ProcessSample]) -> String {
        let mut buf = Vec::new();
        write_table(&mut buf, frame, samples).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn short_names_untouched() {
        assert_eq!(truncate_name("bash"), "bash");
        let exact = "x".repeat(NAME_WIDTH);
        assert_eq!(truncate_name(&exact), exact.as_str());
    }

    #[test]
    fn long_names_get_ellipsis() {
        let long = "a".repeat(60);
        let short = truncate_name(&long);
        assert_eq!(short.chars().count(), 40);
        assert!(short.ends_with("..."));
        assert!(short.starts_with(&"a".repeat(37)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(50);
        let short = truncate_name(&long);
        assert_eq!(short.chars().count(), 40);
    }

    #[test]
    fn header_and_rows() {
        let out = render(&frame(25, 1), &[sample(1234, "worker", 2.5)]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "procmon  |  Refresh 2s  |  Sort: CPU  |  1 processes"
        );
        assert!(lines[1].starts_with("PID     Process"));
        assert!(lines[1].ends_with("CPU(%)"));
        assert_eq!(lines[3], format!("{:<8}{:<40}{:>10}", "1234", "worker", "2.50"));
    }

    #[test]
    fn only_top_rows_rendered() {
        let samples: Vec<ProcessSample> = (0..10).map(|i| sample(i, "p", 0.0)).collect();
        let out = render(&frame(3, samples.len()), &samples);
        let rows = out.lines().filter(|l| l.contains(" p ")).count();
        assert_eq!(rows, 3);
    }

    #[test]
    fn empty_table_is_marked() {
        let out = render(&frame(25, 0), &[]);
        assert!(out.contains("(no processes)"));
    }

    #[test]
    fn clear_screen_only_when_asked() {
        let mut f = frame(5, 0);
        assert!(!render(&f, &[]).contains(CLEAR_SCREEN));
        f.clear_screen = true;
        assert!(render(&f, &[]).starts_with(CLEAR_SCREEN));
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(Duration::from_secs(2)), "2s");
        assert_eq!(format_interval(Duration::from_millis(250)), "250ms");
        assert_eq!(format_interval(Duration::ZERO), "0s");
    }
}
