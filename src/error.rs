//! Error types for parfind
//!
//! This module defines the error hierarchy that covers:
//! - Usage errors (bad find expression, bad root path)
//! - Configuration errors (tuning knobs out of range)
//! - Worker pool errors
//! - Per-directory scan errors (never surfaced as a walk failure)
//!
//! Usage errors are reported before any traversal starts. Once the walk is
//! running, failures are confined to the directory that produced them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for parfind
#[derive(Error, Debug)]
pub enum FindError {
    /// Invalid find expression or root path
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker pool errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (output sink, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FindError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            FindError::Usage(e) => e.kind().exit_code(),
            FindError::Config(_) => 7,
            FindError::Io(_) => 8,
            FindError::Worker(_) => 9,
        }
    }

    /// The usage error kind, if this is a usage error
    pub fn usage_kind(&self) -> Option<UsageErrorKind> {
        match self {
            FindError::Usage(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Classification of usage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageErrorKind {
    /// The same modifier was given twice
    DuplicateFilterModifier,
    /// A modifier that is not `-type`, `-name` or `-iname`
    UnknownFilterModifier,
    /// Malformed argument sequencing
    Generic,
    /// No root path was supplied
    PathMissing,
    /// The root path does not exist
    PathNotFound,
    /// The root path exists but is not a directory
    PathNotDirectory,
}

impl UsageErrorKind {
    /// Default human-readable message
    pub fn default_message(&self) -> &'static str {
        match self {
            UsageErrorKind::DuplicateFilterModifier => "Use one modifier at most one time!",
            UsageErrorKind::UnknownFilterModifier => "Unknown modifier!",
            UsageErrorKind::Generic => "Generic error",
            UsageErrorKind::PathMissing => "Please specify a directory to proceed!",
            UsageErrorKind::PathNotFound => "The path is not accessible or does not exists!",
            UsageErrorKind::PathNotDirectory => "The path is not a directory!",
        }
    }

    /// Process exit status
    pub fn exit_code(&self) -> u8 {
        match self {
            UsageErrorKind::DuplicateFilterModifier => 1,
            UsageErrorKind::UnknownFilterModifier => 2,
            UsageErrorKind::Generic => 3,
            UsageErrorKind::PathMissing => 4,
            UsageErrorKind::PathNotFound => 5,
            UsageErrorKind::PathNotDirectory => 6,
        }
    }
}

/// A usage error with an optional message overriding the default one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct UsageError {
    kind: UsageErrorKind,
    message: Option<String>,
}

impl UsageError {
    /// Create an error carrying the kind's default message
    pub fn new(kind: UsageErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Create an error with a custom message
    pub fn with_message(kind: UsageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn kind(&self) -> UsageErrorKind {
        self.kind
    }

    /// The message to show the user
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

impl From<UsageErrorKind> for UsageError {
    fn from(kind: UsageErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// The job channel closed while the dispatcher still had work
    #[error("Job channel closed unexpectedly")]
    ChannelClosed,
}

/// Errors from listing a single directory
#[derive(Error, Debug)]
pub enum ScanError {
    /// Access denied while opening or reading the directory
    #[error("Permission denied: '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    /// Directory vanished between being queued and being scanned
    #[error("Path not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// Any other enumeration failure
    #[error("Failed to read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while listing `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
            std::io::ErrorKind::NotFound => ScanError::NotFound { path },
            _ => ScanError::ReadDir { path, source: err },
        }
    }

    /// Check if this error is skipped silently rather than reported
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::PermissionDenied { .. })
    }

    /// Returns the path associated with this error
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::PermissionDenied { path } => path,
            ScanError::NotFound { path } => path,
            ScanError::ReadDir { path, .. } => path,
        }
    }
}

/// Result type alias for FindError
pub type Result<T> = std::result::Result<T, FindError>;

/// Result type alias for UsageError
pub type UsageResult<T> = std::result::Result<T, UsageError>;

/// Represents the outcome of scanning a single directory
#[derive(Debug)]
pub enum ScanOutcome {
    /// Directory listed to the end
    Success {
        path: PathBuf,
        entries: usize,
        subdirs: usize,
    },

    /// Nothing to do (symlink, cancelled, permission denied)
    Skipped { path: PathBuf, reason: String },

    /// Enumeration failed part way; remaining children were abandoned
    Failed { path: PathBuf, error: ScanError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        let err = UsageError::new(UsageErrorKind::DuplicateFilterModifier);
        assert_eq!(err.to_string(), "Use one modifier at most one time!");

        let err = UsageError::new(UsageErrorKind::PathNotDirectory);
        assert_eq!(err.message(), "The path is not a directory!");
    }

    #[test]
    fn test_message_override() {
        let err = UsageError::with_message(UsageErrorKind::Generic, "Missing value for '-name'");
        assert_eq!(err.kind(), UsageErrorKind::Generic);
        assert_eq!(err.to_string(), "Missing value for '-name'");

        let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
        assert_eq!(boxed.to_string(), "Missing value for '-name'");

        let top: FindError = err.into();
        assert_eq!(top.to_string(), "Missing value for '-name'");
    }

    #[test]
    fn test_exit_codes() {
        let codes: Vec<u8> = [
            UsageErrorKind::DuplicateFilterModifier,
            UsageErrorKind::UnknownFilterModifier,
            UsageErrorKind::Generic,
            UsageErrorKind::PathMissing,
            UsageErrorKind::PathNotFound,
            UsageErrorKind::PathNotDirectory,
        ]
        .iter()
        .map(|k| k.exit_code())
        .collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);

        let err: FindError = UsageError::new(UsageErrorKind::PathNotFound).into();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.usage_kind(), Some(UsageErrorKind::PathNotFound));

        let err: FindError = ConfigError::InvalidWorkerCount { count: 0, max: 512 }.into();
        assert_eq!(err.exit_code(), 7);
        assert_eq!(err.usage_kind(), None);
    }

    #[test]
    fn test_scan_error_classification() {
        let denied = ScanError::from_io(
            "/secret",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(denied.is_recoverable());
        assert_eq!(denied.path(), &PathBuf::from("/secret"));

        let other = ScanError::from_io("/broken", std::io::Error::other("disk on fire"));
        assert!(!other.is_recoverable());
        assert!(matches!(other, ScanError::ReadDir { .. }));
    }
}
