//! Configuration error types.
//!
//! Structured errors for mapping mutations, schedule toggles, and the JSON
//! store. Per-entry parse problems (rules, schedule entries) are *not*
//! errors; they are retained as invalid entries and warned about at load.

use thiserror::Error;

/// Errors from configuration queries, mutations, and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mapping target names neither a rule set nor the exclusion literal.
    #[error("unknown mapping target {target:?} (expected a rule set name or \"exclude\")")]
    UnknownTarget { target: String },

    /// A mapping keyed by this location does not exist.
    #[error("no mapping exists for {key:?}")]
    UnknownMapping { key: String },

    /// No rule set carries this name.
    #[error("unknown rule set {name:?}")]
    UnknownRuleSet { name: String },

    /// The schedule cannot be toggled while invalid.
    #[error("schedule is invalid (needs two or more entries naming two or more rule sets)")]
    InvalidSchedule,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_target_display() {
        let err = ConfigError::UnknownTarget {
            target: "nope".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("nope"));
        assert!(msg.contains("exclude"));
    }

    #[test]
    fn test_unknown_mapping_display() {
        let err = ConfigError::UnknownMapping {
            key: "arena".to_string(),
        };
        assert!(format!("{err}").contains("arena"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ConfigError::from(io_err);
        assert!(format!("{err}").contains("access denied"));
    }
}
