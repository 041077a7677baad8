//! Cover-image store interface
//!
//! Cover files live outside the library document; the core only records
//! the opaque path a cover store hands back (`Book::cover_image_path`).
//! File layout, formats, and cleanup belong to the implementor.

use anyhow::Result;
use uuid::Uuid;

/// Image storage implemented by the embedding shell, keyed by book id
pub trait CoverImageStore {
    /// Store image bytes for a book, replacing any previous cover,
    /// and return an opaque path to record on the book
    fn save(&self, book_id: Uuid, image: &[u8]) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Remove the stored cover for a book, if any
    fn delete(&self, book_id: Uuid) -> impl std::future::Future<Output = Result<()>> + Send;
}
