//! Storage error handling
//!
//! Typed errors for document persistence, each carrying the path involved.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting or loading the library document
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to create the data directory
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read the document file
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the temporary document file
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The atomic rename onto the real file failed
    #[error("atomic write failed: could not rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The persisted document could not be parsed
    #[error("document at '{path}' is corrupt: {details}")]
    Corrupt { path: PathBuf, details: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_path() {
        let err = StorageError::Read {
            path: PathBuf::from("/data/library.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/library.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_corrupt_display() {
        let err = StorageError::Corrupt {
            path: PathBuf::from("/data/library.json"),
            details: "expected value at line 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("corrupt"));
        assert!(msg.contains("expected value"));
    }
}
