//! Wall-clock tick arithmetic.
//!
//! The time source hands out a 32-bit millisecond counter that wraps to zero
//! roughly every 49.7 days. CPU-time counters are kept in 100 ns units, so
//! elapsed ticks are converted before the two are compared.

/// Wrapping millisecond counter.
pub type Tick = u32;

/// Largest value a [`Tick`] can hold before wrapping.
pub const MAX_TICK: Tick = u32::MAX;

/// Number of 100 ns CPU-time units in one millisecond tick.
pub const CPU_UNITS_PER_TICK: u64 = 10_000;

/// Number of 100 ns CPU-time units in one second.
pub const CPU_UNITS_PER_SEC: u64 = 10_000_000;

/// Milliseconds elapsed between two ticks.
///
/// When `cur` is behind `prev` the counter wrapped, and the result is
/// `MAX_TICK - prev + cur`. Never underflows.
#[inline]
pub fn elapsed_ticks(prev: Tick, cur: Tick) -> u32 {
    if cur >= prev {
        cur - prev
    } else {
        MAX_TICK - prev + cur
    }
}

/// Convert elapsed milliseconds into 100 ns CPU-time units.
#[inline]
pub fn ticks_to_cpu_units(ticks: u32) -> u64 {
    u64::from(ticks) * CPU_UNITS_PER_TICK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_without_wrap() {
        assert_eq!(elapsed_ticks(1_000, 3_000), 2_000);
        assert_eq!(elapsed_ticks(42, 42), 0);
    }

    #[test]
    fn elapsed_across_wrap() {
        let prev = 0xFFFF_FFF0;
        let cur = 0x0000_000A;
        assert_eq!(elapsed_ticks(prev, cur), 0xFFFF_FFFF - prev + cur);
        assert_eq!(elapsed_ticks(prev, cur), 25);
    }

    #[test]
    fn elapsed_from_max_tick() {
        assert_eq!(elapsed_ticks(MAX_TICK, 0), 0);
        assert_eq!(elapsed_ticks(MAX_TICK, 5), 5);
    }

    #[test]
    fn tick_conversion() {
        assert_eq!(ticks_to_cpu_units(1_000), CPU_UNITS_PER_SEC);
        assert_eq!(ticks_to_cpu_units(MAX_TICK), u64::from(MAX_TICK) * 10_000);
    }
}
