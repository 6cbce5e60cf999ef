//! The error type shared by every procmon crate.
//!
//! Variants carry the pid and operation involved rather than a flat string,
//! so the monitor can tell "already gone" apart from "not yours to touch".
//! Each variant has a fixed [`ProcmonError::error_code`] that is printed next
//! to failed terminate requests.
//!
//! Not every error is a failure of the monitor. A process exiting between
//! enumeration and a counter read surfaces as [`ProcmonError::NotFound`] and
//! the caller simply shows that row at 0%.

use std::io;
use thiserror::Error;

/// Everything that can go wrong while sampling or terminating processes.
///
/// | Variant | `error_code()` |
/// |---------|----------------|
/// | `InvalidArgument` | 1 |
/// | `PermissionDenied` | 4 |
/// | `NotFound` | 5 |
/// | `NotSupported` | 6 |
/// | `System` | 8 |
/// | `Io` | 9 |
/// | `Internal` | 99 |
#[derive(Debug, Error)]
pub enum ProcmonError {
    /// Rejected input: pid 0, `--top 0`, an unparseable interval.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The OS refused `operation` on `pid` for the current user.
    #[error("permission denied: cannot {operation} PID {pid}")]
    PermissionDenied {
        pid: u32,
        /// Verb phrase, e.g. "terminate" or "read cpu time".
        operation: String,
    },

    /// `pid` does not exist, or exited before we got to it.
    #[error("no process with PID {pid}")]
    NotFound { pid: u32 },

    #[error("{feature} is not supported on {platform}")]
    NotSupported { feature: String, platform: String },

    /// An OS call failed for a reason with no dedicated variant.
    #[error("{message} (os error {errno})")]
    System {
        message: String,
        /// `errno` on Unix, `GetLastError()` on Windows.
        errno: i32,
    },

    /// Reading commands from stdin or writing the table to stdout failed.
    #[error("terminal I/O failed: {source}")]
    Io {
        #[source]
        source: io::Error,
    },

    /// A platform primitive misbehaved in a way the caller cannot act on.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ProcmonError {
    /// Stable numeric code for reports.
    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 1,
            Self::PermissionDenied { .. } => 4,
            Self::NotFound { .. } => 5,
            Self::NotSupported { .. } => 6,
            Self::System { .. } => 8,
            Self::Io { .. } => 9,
            Self::Internal { .. } => 99,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn permission_denied(pid: u32, operation: impl Into<String>) -> Self {
        Self::PermissionDenied {
            pid,
            operation: operation.into(),
        }
    }

    pub fn not_found(pid: u32) -> Self {
        Self::NotFound { pid }
    }

    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    pub fn system(message: impl Into<String>, errno: i32) -> Self {
        Self::System {
            message: message.into(),
            errno,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<io::Error> for ProcmonError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

/// `Result` with [`ProcmonError`].
pub type ProcmonResult<T> = Result<T, ProcmonError>;
