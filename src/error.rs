//! Error types for dirx
//!
//! This module defines the error hierarchy for:
//! - The traversal root (the only fatal walk error)
//! - Configuration and CLI validation
//! - The static extension-group table
//! - Worker threads
//!
//! Per-directory failures below the root are not errors at this level;
//! they are reported as a [`VisitOutcome`] and absorbed by the walker.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for dirx
#[derive(Error, Debug)]
pub enum CensusError {
    /// The starting directory could not be listed
    #[error("Cannot read '{path}': {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The starting path exists but is not a directory
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed extension-group table
    #[error("Extension table error: {0}")]
    Canonical(#[from] CanonicalError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors outside of the walk (reading stdin, writing the report)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Collector channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid thread count
    #[error("Invalid thread count {count}: must be between 1 and {max}")]
    InvalidThreadCount { count: usize, max: usize },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Root path is empty
    #[error("Root path must not be empty")]
    EmptyRoot,
}

/// Structural problems in the extension-group table
///
/// These are detected once, when the [`Canonicalizer`](crate::stats::Canonicalizer)
/// is built, before any traversal begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// A group's key is not one of its own members
    #[error("Group '{group}' does not list its own key as a member")]
    KeyNotMember { group: String },

    /// An extension is claimed by two groups
    #[error("Extension '{extension}' belongs to both '{first}' and '{second}'")]
    DuplicateMember {
        extension: String,
        first: String,
        second: String,
    },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Collector thread panicked
    #[error("Collector thread panicked")]
    CollectorPanicked,
}

/// Result type alias for CensusError
pub type Result<T> = std::result::Result<T, CensusError>;

/// Represents the outcome of visiting a single directory
#[derive(Debug)]
pub enum VisitOutcome {
    /// Directory was listed and all its entries handed off
    Success {
        path: PathBuf,
        files: usize,
        subdirs: usize,
    },

    /// Directory could not be read for a benign reason (permission denied)
    Skipped { path: PathBuf, reason: String },

    /// Directory could not be read for any other reason
    Failed {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl VisitOutcome {
    /// Classify a read_dir failure for a directory below the root
    pub fn from_io_error(path: PathBuf, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            VisitOutcome::Skipped {
                path,
                reason: error.to_string(),
            }
        } else {
            VisitOutcome::Failed { path, error }
        }
    }

    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, VisitOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &std::path::Path {
        match self {
            VisitOutcome::Success { path, .. } => path,
            VisitOutcome::Skipped { path, .. } => path,
            VisitOutcome::Failed { path, .. } => path,
        }
    }
}
