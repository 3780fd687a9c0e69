//! Unified error types for Summit.
//!
//! The engine is strict: every failure is returned to the caller as a typed
//! error. Nothing here logs a warning and substitutes a default, because a
//! silently wrong phase or tier is worse for the user than a visible failure.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Summit operations.
#[derive(Error, Debug)]
pub enum SummitError {
    /// Malformed milestone, catalog, or threshold configuration.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Snapshot history that is out of order, duplicated, or malformed.
    #[error("invalid history: {message}")]
    InvalidHistory { message: String },

    /// Unknown template or goal id.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// A computed value escaped its expected domain (upstream data bug).
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Another writer updated the goal's phase first.
    #[error("phase conflict for {goal_id}: expected version {expected}, found {actual}")]
    Conflict {
        goal_id: String,
        expected: u64,
        actual: u64,
    },

    /// I/O errors from phase store or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration file loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for Summit operations.
pub type Result<T> = std::result::Result<T, SummitError>;

impl SummitError {
    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid history error.
    pub fn invalid_history(message: impl Into<String>) -> Self {
        Self::InvalidHistory {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a version conflict error.
    pub fn conflict(goal_id: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            goal_id: goal_id.into(),
            expected,
            actual,
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the operation.
    ///
    /// Only optimistic-concurrency conflicts are transient. The caller
    /// re-reads the stored phase and classifies again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<io::Error> for SummitError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SummitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Exit codes for the Summit CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Engine rejected the input or a lookup failed.
    pub const FAILURE: i32 = 1;

    /// Bad command-line usage or unreadable input file.
    pub const USAGE: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = SummitError::invalid_config("target below start");
        assert_eq!(err.to_string(), "invalid config: target below start");
    }

    #[test]
    fn test_invalid_history_display() {
        let err = SummitError::invalid_history("duplicate week 2026-01-05");
        assert_eq!(err.to_string(), "invalid history: duplicate week 2026-01-05");
    }

    #[test]
    fn test_not_found_display() {
        let err = SummitError::not_found("l2-missing");
        assert_eq!(err.to_string(), "not found: l2-missing");
    }

    #[test]
    fn test_invariant_display() {
        let err = SummitError::invariant("recovery = 1.2");
        assert_eq!(err.to_string(), "invariant violation: recovery = 1.2");
    }

    #[test]
    fn test_conflict_display() {
        let err = SummitError::conflict("goal-1", 3, 4);
        assert_eq!(
            err.to_string(),
            "phase conflict for goal-1: expected version 3, found 4"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let err = SummitError::storage(
            "/tmp/phase.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("/tmp/phase.json"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        let engine_errors = vec![
            SummitError::invalid_config("test"),
            SummitError::invalid_history("test"),
            SummitError::not_found("test"),
            SummitError::invariant("test"),
            SummitError::serde("test"),
            SummitError::config("test"),
        ];

        for err in engine_errors {
            assert!(!err.is_retryable(), "{} should not be retryable", err);
        }
        assert!(SummitError::conflict("g", 1, 2).is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: SummitError = io_err.into();
        assert!(matches!(err, SummitError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SummitError = json_err.into();
        assert!(matches!(err, SummitError::Serde { .. }));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::FAILURE, 1);
        assert_eq!(exit_codes::USAGE, 2);
    }
}
