//! Book repository

use std::sync::Arc;

use uuid::Uuid;

use crate::document::LibraryDocument;
use crate::error::{LibraryError, LibraryResult};
use crate::models::Book;
use crate::normalize;
use crate::store::DocumentStore;

/// Payload for creating a book
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    pub page_count: Option<u32>,
    pub purchase_price: Option<f64>,
    /// Defaults to 1 when unspecified
    pub total_copies: Option<u32>,
    /// Defaults to `total_copies`; clamped to `[0, total_copies]`
    pub available_copies: Option<u32>,
    pub categories: Vec<String>,
    pub note: Option<String>,
    pub cover_image_path: Option<String>,
}

/// Partial update for a book
///
/// `None` means "leave unchanged". Clearable optional fields nest another
/// `Option`: `Some(None)` clears the field, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<Option<String>>,
    pub publisher: Option<Option<String>>,
    pub publish_year: Option<Option<i32>>,
    pub page_count: Option<Option<u32>>,
    pub purchase_price: Option<Option<f64>>,
    pub total_copies: Option<u32>,
    pub available_copies: Option<u32>,
    pub categories: Option<Vec<String>>,
    pub note: Option<Option<String>>,
    pub cover_image_path: Option<Option<String>>,
}

/// Typed CRUD over the `books` collection
pub struct BookRepository {
    store: Arc<DocumentStore>,
}

impl BookRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> LibraryResult<Vec<Book>> {
        Ok(self.store.read().await?.books)
    }

    pub async fn find_by_id(&self, id: Uuid) -> LibraryResult<Option<Book>> {
        Ok(self.store.read().await?.book(id).cloned())
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<Option<Book>> {
        let doc = self.store.read().await?;
        Ok(doc
            .books
            .iter()
            .find(|book| book.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    /// Create a book
    ///
    /// Normalizes the payload, then inserts inside one transaction that
    /// also checks ISBN uniqueness and unions novel category names into
    /// the document's category set.
    pub async fn create(&self, payload: NewBook) -> LibraryResult<Book> {
        let title = normalize::required_text(&payload.title, "title")?;
        let author = normalize::required_text(&payload.author, "author")?;

        let total_copies = payload.total_copies.unwrap_or(1);
        let available_copies = payload
            .available_copies
            .unwrap_or(total_copies)
            .min(total_copies);

        let mut book = Book::new(title, author);
        book.isbn = normalize::clean_text(payload.isbn.as_deref());
        book.publisher = normalize::clean_text(payload.publisher.as_deref());
        book.publish_year = payload.publish_year;
        book.page_count = payload.page_count;
        book.purchase_price = payload.purchase_price;
        book.total_copies = total_copies;
        book.available_copies = available_copies;
        book.categories = normalize::clean_categories(&payload.categories);
        book.note = normalize::clean_text(payload.note.as_deref());
        book.cover_image_path = payload.cover_image_path;

        let record = book.clone();
        self.store
            .write(move |doc| {
                if let Some(isbn) = &record.isbn {
                    if doc.isbn_taken(isbn, None) {
                        return Err(LibraryError::DuplicateIsbn(isbn.clone()));
                    }
                }
                doc.ensure_categories(record.categories.iter().map(String::as_str));
                doc.books.push(record);
                Ok(())
            })
            .await?;

        Ok(book)
    }

    /// Apply a partial update to a book
    ///
    /// Runs inside one transaction; an ISBN change is checked for
    /// uniqueness against every other book, and new category names join
    /// the document's category set in the same commit. The available
    /// count is clamped down to the (possibly new) total afterwards.
    pub async fn update(&self, id: Uuid, patch: BookPatch) -> LibraryResult<Book> {
        let BookPatch {
            title,
            author,
            isbn,
            publisher,
            publish_year,
            page_count,
            purchase_price,
            total_copies,
            available_copies,
            categories,
            note,
            cover_image_path,
        } = patch;

        let title = title
            .map(|value| normalize::required_text(&value, "title"))
            .transpose()?;
        let author = author
            .map(|value| normalize::required_text(&value, "author"))
            .transpose()?;
        let isbn = isbn.map(|value| normalize::clean_text(value.as_deref()));
        let publisher = publisher.map(|value| normalize::clean_text(value.as_deref()));
        let note = note.map(|value| normalize::clean_text(value.as_deref()));
        let categories = categories.map(|value| normalize::clean_categories(&value));

        let committed = self
            .store
            .write(move |doc| {
                if doc.book(id).is_none() {
                    return Err(LibraryError::BookNotFound(id));
                }
                if let Some(Some(new_isbn)) = &isbn {
                    if doc.isbn_taken(new_isbn, Some(id)) {
                        return Err(LibraryError::DuplicateIsbn(new_isbn.clone()));
                    }
                }
                if let Some(names) = &categories {
                    doc.ensure_categories(names.iter().map(String::as_str));
                }

                let book = doc
                    .book_mut(id)
                    .ok_or(LibraryError::BookNotFound(id))?;
                if let Some(value) = title {
                    book.title = value;
                }
                if let Some(value) = author {
                    book.author = value;
                }
                if let Some(value) = isbn {
                    book.isbn = value;
                }
                if let Some(value) = publisher {
                    book.publisher = value;
                }
                if let Some(value) = publish_year {
                    book.publish_year = value;
                }
                if let Some(value) = page_count {
                    book.page_count = value;
                }
                if let Some(value) = purchase_price {
                    book.purchase_price = value;
                }
                if let Some(value) = total_copies {
                    book.total_copies = value;
                }
                if let Some(value) = available_copies {
                    book.available_copies = value;
                }
                if let Some(value) = categories {
                    book.categories = value;
                }
                if let Some(value) = note {
                    book.note = value;
                }
                if let Some(value) = cover_image_path {
                    book.cover_image_path = value;
                }

                book.available_copies = book.available_copies.min(book.total_copies);
                book.touch();
                Ok(())
            })
            .await?;

        committed
            .book(id)
            .cloned()
            .ok_or(LibraryError::BookNotFound(id))
    }

    /// Move the available count by `delta`, within `[0, total_copies]`
    pub async fn adjust_availability(&self, id: Uuid, delta: i64) -> LibraryResult<Book> {
        let committed = self
            .store
            .write(move |doc: &mut LibraryDocument| {
                let book = doc
                    .book_mut(id)
                    .ok_or(LibraryError::BookNotFound(id))?;
                let next = i64::from(book.available_copies) + delta;
                if next < 0 || next > i64::from(book.total_copies) {
                    return Err(LibraryError::InvariantViolation(format!(
                        "available copies would become {next}, outside 0..={}",
                        book.total_copies
                    )));
                }
                book.available_copies = next as u32;
                book.touch();
                Ok(())
            })
            .await?;

        committed
            .book(id)
            .cloned()
            .ok_or(LibraryError::BookNotFound(id))
    }
}
