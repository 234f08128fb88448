//! Storage error handling
//!
//! Typed errors for backend operations, with recovery suggestions for the
//! failures an operator can actually do something about.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur inside a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Database file was written by a newer schema
    #[error("Database at '{path}' has schema version {found}, expected at most {supported}")]
    UnsupportedSchema {
        path: PathBuf,
        found: i32,
        supported: i32,
    },

    /// A stored row could not be turned back into a record
    #[error("Corrupt row in '{table}': {details}")]
    CorruptRow { table: &'static str, details: String },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StorageError {
    /// Create an error from an I/O error raised while preparing `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ => StorageError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions, or point WAYPOST_DATA_DIR somewhere writable.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::UnsupportedSchema { .. } => {
                Some("Upgrade waypost, or move the database aside to start fresh.")
            }
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
