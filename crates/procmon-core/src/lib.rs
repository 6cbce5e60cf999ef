//! procmon-core: Core types, errors, and tick arithmetic
//!
//! This crate provides the foundational pieces shared by all procmon crates:
//! - The canonical error type [`ProcmonError`]
//! - Wrapping tick arithmetic for the sampling clock ([`tick`])
//! - Schema ID constants for JSON output ([`schema`])
//! - Platform detection utilities

use std::env::consts::OS;

pub mod error;
pub mod schema;
pub mod tick;

pub use error::{ProcmonError, ProcmonResult};
pub use tick::{elapsed_ticks, Tick, MAX_TICK};

// ============================================================================
// Platform Detection
// ============================================================================

/// Get the current platform identifier.
///
/// Returns one of: "linux", "macos", "windows", "freebsd", etc.
#[inline]
pub fn get_platform() -> &'static str {
    OS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_platform() {
        let platform = get_platform();
        assert!(!platform.is_empty());
        assert!(
            ["linux", "macos", "windows", "freebsd"].contains(&platform),
            "Unexpected platform: {}",
            platform
        );
    }
}
