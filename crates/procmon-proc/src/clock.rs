//! Sampling clock: a wrapping millisecond tick and the logical core count.

use std::time::Instant;

use procmon_core::Tick;

/// Time source the monitor samples against.
pub trait Clock {
    /// Current tick. Wraps to zero after `MAX_TICK`.
    fn now_tick(&self) -> Tick;

    /// Number of logical processors, at least 1.
    fn core_count(&self) -> u32;
}

/// Monotonic milliseconds since the clock was created, truncated to 32 bits.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_tick(&self) -> Tick {
        let millis = self.origin.elapsed().as_millis();
        (millis & u128::from(Tick::MAX)) as Tick
    }

    fn core_count(&self) -> u32 {
        core_count_impl().max(1)
    }
}

/// Online logical processors via `sysconf`; 0 if the query fails.
#[cfg(unix)]
fn core_count_impl() -> u32 {
    let result = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if result <= 0 {
        0
    } else {
        u32::try_from(result).unwrap_or(u32::MAX)
    }
}

#[cfg(windows)]
fn core_count_impl() -> u32 {
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    unsafe {
        let mut info: SYSTEM_INFO = std::mem::zeroed();
        GetSystemInfo(&mut info);
        info.dwNumberOfProcessors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_count_positive() {
        let clock = SystemClock::new();
        assert!(clock.core_count() >= 1);
    }

    #[test]
    fn test_core_count_matches_platform_when_known() {
        let raw = core_count_impl();
        let clock = SystemClock::new();
        if raw > 0 {
            assert_eq!(clock.core_count(), raw);
        } else {
            assert_eq!(clock.core_count(), 1);
        }
    }

    #[test]
    fn test_tick_advances() {
        let clock = SystemClock::new();
        let first = clock.now_tick();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let second = clock.now_tick();
        assert!(procmon_core::elapsed_ticks(first, second) >= 20);
    }
}
