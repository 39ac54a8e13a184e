//! Unified error types for Casebook.
//!
//! Rejected player actions (a full evidence board, an id the content does
//! not know) come back as explicit errors and leave the session untouched.
//! Infrastructure errors (config files, content files, scripts) follow a
//! fail-open approach where a sensible default exists: log a warning and
//! carry on rather than ending the session.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of content entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Evidence card id.
    Card,
    /// Interview question id.
    Question,
    /// Answer choice id within a question.
    Choice,
    /// Insight id.
    Insight,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Card => "card",
            ReferenceKind::Question => "question",
            ReferenceKind::Choice => "choice",
            ReferenceKind::Insight => "insight",
        };
        f.write_str(name)
    }
}

/// The main error type for Casebook operations.
#[derive(Error, Debug)]
pub enum CasebookError {
    /// A new card was committed while the evidence board was full.
    #[error("commit capacity exceeded: {capacity} cards already committed")]
    CapacityExceeded { capacity: usize },

    /// An id that is not present in the loaded content.
    #[error("unknown {kind}: {id}")]
    UnknownReference { kind: ReferenceKind, id: String },

    /// Content failed validation.
    #[error("content error: {message}")]
    Content { message: String },

    /// I/O errors reading content, config, or scripts.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading or validation errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed line in an action script.
    #[error("script error on line {line}: {message}")]
    Script { line: usize, message: String },
}

/// A specialized Result type for Casebook operations.
pub type Result<T> = std::result::Result<T, CasebookError>;

impl CasebookError {
    /// Create a capacity error.
    pub fn capacity_exceeded(capacity: usize) -> Self {
        Self::CapacityExceeded { capacity }
    }

    /// Create an unknown reference error.
    pub fn unknown(kind: ReferenceKind, id: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind,
            id: id.into(),
        }
    }

    /// Create a content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
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

    /// Create a script error.
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// Check if this error is a rejected player action.
    ///
    /// Rejected actions never change state; the caller can surface them
    /// and keep playing.
    pub fn is_rejected_action(&self) -> bool {
        matches!(
            self,
            CasebookError::CapacityExceeded { .. } | CasebookError::UnknownReference { .. }
        )
    }
}

impl From<io::Error> for CasebookError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CasebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Logs the error and returns a safe default instead of propagating.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Casebook CLI.
pub mod exit_codes {
    /// Everything succeeded.
    pub const SUCCESS: u8 = 0;

    /// The command ran but reported failures (rejected actions, invalid content).
    pub const FAILURE: u8 = 1;

    /// The command could not run (unreadable input, bad arguments).
    pub const ERROR: u8 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_display() {
        let err = CasebookError::capacity_exceeded(3);
        assert_eq!(
            err.to_string(),
            "commit capacity exceeded: 3 cards already committed"
        );
    }

    #[test]
    fn test_unknown_reference_display() {
        let err = CasebookError::unknown(ReferenceKind::Insight, "ins-9");
        assert_eq!(err.to_string(), "unknown insight: ins-9");
    }

    #[test]
    fn test_storage_error_display() {
        let err = CasebookError::storage(
            "/tmp/content.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/content.json"));
    }

    #[test]
    fn test_script_error_display() {
        let err = CasebookError::script(4, "unknown action 'jump'");
        assert_eq!(
            err.to_string(),
            "script error on line 4: unknown action 'jump'"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = CasebookError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_is_rejected_action() {
        assert!(CasebookError::capacity_exceeded(3).is_rejected_action());
        assert!(CasebookError::unknown(ReferenceKind::Card, "c").is_rejected_action());
        assert!(!CasebookError::content("dup").is_rejected_action());
        assert!(!CasebookError::config("bad").is_rejected_action());
        assert!(!CasebookError::script(1, "bad").is_rejected_action());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: CasebookError = io_err.into();
        assert!(matches!(err, CasebookError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: CasebookError = json_err.into();
        assert!(matches!(err, CasebookError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(CasebookError::config("test"));
        let value = result.fail_open_default("test context");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(CasebookError::config("test"));
        let value = result.fail_open_with("test context", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        let value = result.fail_open_default("test context");
        assert_eq!(value, 100);
    }
}
