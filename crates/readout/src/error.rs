//! Error types for progress rendering and column printing.
//!
//! Precondition violations (advancing past the total, rendering before the
//! total is known, a zero throttle) are reported as soon as they happen and
//! are never clamped away. Write failures carry the underlying I/O error.

use thiserror::Error;

/// Errors that can occur while driving an indicator or writing to a console.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// An indicator was created with an expected size of zero.
    #[error("expected size must be greater than zero")]
    ZeroTotal,

    /// The render throttle was set to zero ticks.
    #[error("render throttle `every` must be at least 1")]
    ZeroEvery,

    /// An advance would move `processed` beyond `total`.
    #[error("progress overflow: {processed} > {total}")]
    PastTotal { processed: u64, total: u64 },

    /// The indicator needs its total to render but none was supplied.
    #[error("total is not known yet; call set_total before rendering")]
    UnknownTotal,

    /// `set_total` was called on an indicator that already has one.
    #[error("total was already set to {0}")]
    TotalAlreadySet(u64),

    /// Another indicator already owns the console line.
    #[error("another progress indicator is already active on this console")]
    LineBusy,

    /// The line handle no longer owns the console line.
    #[error("line handle does not own the active console line")]
    StaleHandle,

    /// Writing to the output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An indicator configuration could not be parsed.
    #[error("invalid indicator configuration: {0}")]
    Config(String),

    /// The global log subscriber could not be installed.
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}

impl ProgressError {
    /// True when the error is a write to a reader that has gone away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ProgressError::Io(err) if err.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

impl From<serde_yaml::Error> for ProgressError {
    fn from(err: serde_yaml::Error) -> Self {
        ProgressError::Config(err.to_string())
    }
}

/// Result type for readout operations.
pub type Result<T> = std::result::Result<T, ProgressError>;
