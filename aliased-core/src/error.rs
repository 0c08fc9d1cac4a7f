//! Error types for state persistence

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while locating, reading or writing tool files
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user's home directory could not be determined
    #[error("could not determine the home directory")]
    HomeNotFound,

    /// Filesystem operation failed
    #[error("{action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (e.g. "failed to write")
        action: &'static str,
        /// File or directory involved
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file exists but does not hold a valid account list
    #[error("malformed state file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Account list could not be serialized
    #[error("failed to serialize accounts: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Check if this error means the file simply is not there yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
