//! Error handling module for shelfport
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every failure a command can hit maps to one of these variants so the menu
//! boundary can render it as operator-readable text.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shelfport
#[derive(Error, Debug)]
pub enum ShelfError {
    /// IO errors (file operations, process spawning, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No removable or USB-attached volume with a mount point was found
    #[error("no eligible removable volume found")]
    NoEligibleVolume,

    /// Operator input did not match any discovered volume
    #[error("no volume matches '{0}'")]
    SelectionInvalid(String),

    /// Operator declined the confirmation prompt
    #[error("cancelled by operator")]
    UserCancelled,

    /// Network download failed (connection error or non-success status)
    #[error("network fetch failed: {0}")]
    NetworkFetch(String),

    /// The downloaded tool archive could not be unpacked
    #[error("archive extraction failed: {0}")]
    ArchiveExtract(String),

    /// A write onto the target volume failed
    #[error("write failed at {}: {source}", .path.display())]
    FilesystemWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required external binary is absent from the tools directory
    #[error("'{name}' is missing from the tools directory. {hint}")]
    ToolMissing { name: String, hint: String },

    /// JSON serialization/deserialization errors (server pidfile)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for shelfport operations
pub type Result<T> = std::result::Result<T, ShelfError>;

// Convenient error constructors
impl ShelfError {
    /// Create a selection error from the operator's raw input
    pub fn selection_invalid(input: impl Into<String>) -> Self {
        Self::SelectionInvalid(input.into())
    }

    /// Create a network fetch error
    pub fn network_fetch(msg: impl Into<String>) -> Self {
        Self::NetworkFetch(msg.into())
    }

    /// Create an archive extraction error
    pub fn archive_extract(msg: impl Into<String>) -> Self {
        Self::ArchiveExtract(msg.into())
    }

    /// Create a filesystem write error carrying the offending path
    pub fn fs_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a missing-tool error with a remediation hint
    pub fn tool_missing(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolMissing {
            name: name.into(),
            hint: hint.into(),
        }
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
