//! Transactional document store
//!
//! The `DocumentStore` owns the on-disk library document and is the only
//! way to evolve it. A transaction is one serialized
//! read-transform-persist cycle: the writer lock is held across all three
//! phases, so every transform observes the latest committed document and
//! no update can be lost to a concurrent read-modify-write race.
//!
//! ## Usage
//!
//! ```ignore
//! let store = DocumentStore::open(path).await?;
//!
//! let doc = store.read().await?;
//!
//! store
//!     .write(|doc| {
//!         doc.categories.push("novel".to_string());
//!         Ok::<_, LibraryError>(())
//!     })
//!     .await?;
//! ```

use std::path::Path;

use tokio::sync::Mutex;
use tracing::debug;

use crate::document::LibraryDocument;
use crate::storage::{DocumentPersistence, StorageError, StorageResult};

/// Durable, serialized, all-or-nothing store for the library document
pub struct DocumentStore {
    persistence: DocumentPersistence,
    /// Guards the whole read-transform-persist cycle, not just the file write
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open the store at the given path
    ///
    /// On first use, persists a document holding four empty collections.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let persistence = DocumentPersistence::new(path.as_ref());
        persistence.ensure_exists().await?;
        debug!(path = %persistence.path().display(), "opened document store");
        Ok(Self {
            persistence,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the document file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// Snapshot of the current durable document
    ///
    /// Takes no lock: commits replace the file by atomic rename, so a read
    /// observes either wholly-pre- or wholly-post-commit state.
    pub async fn read(&self) -> StorageResult<LibraryDocument> {
        self.persistence.load().await
    }

    /// Run one transaction against the document
    ///
    /// Loads the current durable document, applies `transform` to it, and
    /// persists the result before returning it. If `transform` fails, the
    /// transaction aborts and durable state is untouched. Concurrent
    /// `write` calls are totally ordered; each transform observes the
    /// previous caller's committed result.
    pub async fn write<F, E>(&self, transform: F) -> Result<LibraryDocument, E>
    where
        F: FnOnce(&mut LibraryDocument) -> Result<(), E>,
        E: From<StorageError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.persistence.load().await?;
        transform(&mut doc)?;
        self.persistence.save(&doc).await?;
        debug!(path = %self.path().display(), "committed document transaction");

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use crate::models::Book;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn doc_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("library.json")
    }

    #[tokio::test]
    async fn test_open_creates_empty_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(doc_path(&temp_dir)).await.unwrap();

        let doc = store.read().await.unwrap();
        assert_eq!(doc, LibraryDocument::default());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_write_persists_transform_result() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(doc_path(&temp_dir)).await.unwrap();

        let committed = store
            .write(|doc| {
                doc.books.push(Book::new("Dune", "Frank Herbert"));
                Ok::<_, LibraryError>(())
            })
            .await
            .unwrap();
        assert_eq!(committed.books.len(), 1);

        // A fresh store instance sees the committed state
        let reopened = DocumentStore::open(doc_path(&temp_dir)).await.unwrap();
        let doc = reopened.read().await.unwrap();
        assert_eq!(doc.books.len(), 1);
        assert_eq!(doc.books[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_failed_transform_aborts_without_change() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(doc_path(&temp_dir)).await.unwrap();

        store
            .write(|doc| {
                doc.books.push(Book::new("Dune", "Frank Herbert"));
                Ok::<_, LibraryError>(())
            })
            .await
            .unwrap();

        let result = store
            .write(|doc| {
                doc.books.clear();
                Err::<(), _>(LibraryError::OutOfStock)
            })
            .await;
        assert!(matches!(result, Err(LibraryError::OutOfStock)));

        // Durable state untouched by the aborted transaction
        let doc = store.read().await.unwrap();
        assert_eq!(doc.books.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_are_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(DocumentStore::open(doc_path(&temp_dir)).await.unwrap());

        // Each task appends a category based on the count it observed; if
        // two transforms ever saw the same snapshot, names would collide.
        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .write(|doc| {
                        let name = format!("category-{}", doc.categories.len());
                        doc.categories.push(name);
                        Ok::<_, LibraryError>(())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.read().await.unwrap();
        assert_eq!(doc.categories.len(), 10);
        let mut names: Vec<String> = doc.categories.clone();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[tokio::test]
    async fn test_read_reports_corrupt_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = doc_path(&temp_dir);
        let store = DocumentStore::open(&path).await.unwrap();

        std::fs::write(&path, b"definitely not json").unwrap();
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_write_returns_committed_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(doc_path(&temp_dir)).await.unwrap();

        let committed = store
            .write(|doc| {
                doc.categories.push("novel".to_string());
                Ok::<_, LibraryError>(())
            })
            .await
            .unwrap();

        let durable = store.read().await.unwrap();
        assert_eq!(committed, durable);
    }
}
