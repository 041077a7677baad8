//! External metadata lookup interface
//!
//! ISBN/title lookup over the network is owned by the embedding shell;
//! the core only defines the normalized record it consumes and how that
//! record pre-fills a book-creation payload. Lookup output is untrusted
//! input: every field goes through the same normalization as any other
//! create payload.

use anyhow::Result;

use crate::normalize;
use crate::repo::NewBook;

/// Normalized record returned by a metadata provider
///
/// Numeric fields arrive as raw text exactly as the provider sent them;
/// coercion happens during prefill, with malformed values treated as
/// absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<String>,
    pub page_count: Option<String>,
    pub subjects: Vec<String>,
}

impl BookMetadata {
    /// Pre-fill a book-creation payload from this record
    ///
    /// The result is still subject to full repository validation on
    /// `create`; in particular a blank title is rejected there, not here.
    pub fn into_new_book(self, isbn: Option<String>) -> NewBook {
        NewBook {
            title: self.title.unwrap_or_default(),
            author: self.authors.join(", "),
            isbn,
            publisher: self.publisher,
            publish_year: self
                .publish_year
                .as_deref()
                .and_then(normalize::parse_integer)
                .and_then(|year| i32::try_from(year).ok()),
            page_count: self
                .page_count
                .as_deref()
                .and_then(normalize::parse_integer)
                .and_then(|count| u32::try_from(count).ok()),
            categories: self.subjects,
            ..NewBook::default()
        }
    }
}

/// Lookup service implemented by the embedding shell
///
/// Network, retry, and timeout behavior belong to the implementor; the
/// core only consumes the normalized records.
pub trait MetadataLookup {
    /// Look up a single record by ISBN
    fn lookup_isbn(&self, isbn: &str) -> impl std::future::Future<Output = Result<Option<BookMetadata>>> + Send;

    /// Search records by title
    fn search_title(&self, title: &str) -> impl std::future::Future<Output = Result<Vec<BookMetadata>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefill_parses_numeric_text() {
        let metadata = BookMetadata {
            title: Some("Dune".to_string()),
            authors: vec!["Frank Herbert".to_string()],
            publisher: Some("Chilton Books".to_string()),
            publish_year: Some("1965".to_string()),
            page_count: Some("412 pages".to_string()),
            subjects: vec!["sci-fi".to_string()],
        };

        let payload = metadata.into_new_book(Some("9780441013593".to_string()));
        assert_eq!(payload.title, "Dune");
        assert_eq!(payload.author, "Frank Herbert");
        assert_eq!(payload.publish_year, Some(1965));
        assert_eq!(payload.page_count, Some(412));
        assert_eq!(payload.categories, vec!["sci-fi"]);
        assert_eq!(payload.isbn.as_deref(), Some("9780441013593"));
    }

    #[test]
    fn test_prefill_treats_malformed_numbers_as_absent() {
        let metadata = BookMetadata {
            title: Some("Dune".to_string()),
            publish_year: Some("first edition".to_string()),
            page_count: Some("n/a".to_string()),
            ..BookMetadata::default()
        };

        let payload = metadata.into_new_book(None);
        assert_eq!(payload.publish_year, None);
        assert_eq!(payload.page_count, None);
    }

    #[test]
    fn test_prefill_joins_multiple_authors() {
        let metadata = BookMetadata {
            title: Some("Design Patterns".to_string()),
            authors: vec!["Gamma".to_string(), "Helm".to_string()],
            ..BookMetadata::default()
        };

        let payload = metadata.into_new_book(None);
        assert_eq!(payload.author, "Gamma, Helm");
    }
}
