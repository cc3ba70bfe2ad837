//! # Error Types
//!
//! Parse-level errors for rule sentences, schedule entries, week times,
//! and flag names. All errors use `thiserror` for derive-based `Display`
//! and `Error` implementations.
//!
//! Parse failures in user-authored text are deliberately non-fatal at the
//! container level: rules and schedule entries carry a `valid` marker and
//! are excluded from evaluation rather than aborting a load. These error
//! types surface the same failures at API boundaries that want a `Result`.

use thiserror::Error;

/// Top-level error type for pax core types.
#[derive(Error, Debug)]
pub enum PaxError {
    /// Week-time text did not match `[D.]HH:MM[:SS]`.
    #[error("invalid week time {0:?}")]
    InvalidWeekTime(String),

    /// Rule sentence could not be translated (fewer than three tokens).
    #[error("invalid rule {0:?}")]
    InvalidRule(String),

    /// Schedule entry text could not be translated.
    #[error("invalid schedule entry {0:?}")]
    InvalidScheduleEntry(String),

    /// Behavior flag name is not recognized.
    #[error("unknown rule flag {0:?}")]
    UnknownFlag(String),
}
