//! Library document persistence
//!
//! Handles loading and saving the JSON document. Saves go through an
//! atomic write (temp file beside the target, flush, rename) so the real
//! file is never observed half-written.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::document::LibraryDocument;
use crate::storage::{StorageError, StorageResult};

/// Persistence layer for the library document
///
/// Owns the resolved file path and the atomic-write protocol.
#[derive(Debug, Clone)]
pub struct DocumentPersistence {
    path: PathBuf,
}

impl DocumentPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a document exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create an empty document on disk if none exists yet
    pub async fn ensure_exists(&self) -> StorageResult<()> {
        if self.exists() {
            return Ok(());
        }
        self.save(&LibraryDocument::default()).await
    }

    /// Load and parse the document
    ///
    /// Unreadable files surface as `Read`; unparseable content as `Corrupt`.
    pub async fn load(&self) -> StorageResult<LibraryDocument> {
        let bytes = fs::read(&self.path).await.map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|err| StorageError::Corrupt {
            path: self.path.clone(),
            details: err.to_string(),
        })
    }

    /// Persist the document durably
    ///
    /// Pretty-printed JSON, written via the atomic-rename protocol.
    pub async fn save(&self, doc: &LibraryDocument) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|err| StorageError::Corrupt {
            path: self.path.clone(),
            details: err.to_string(),
        })?;
        atomic_write(&self.path, &bytes).await
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file onto the target path
async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .await
        .map_err(|source| StorageError::Write {
            path: temp_path.clone(),
            source,
        })?;

    file.write_all(data)
        .await
        .map_err(|source| StorageError::Write {
            path: temp_path.clone(),
            source,
        })?;

    file.sync_all()
        .await
        .map_err(|source| StorageError::Write {
            path: temp_path.clone(),
            source,
        })?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|source| StorageError::Rename {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })?;

    Ok(())
}
