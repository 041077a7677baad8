//! Data models for Biblio
//!
//! Defines the core entities: Book, Member, and Loan. Field names are
//! serialized in camelCase to stay compatible with the historical
//! `library.json` document layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book in the library's inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Unique among books when present
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    pub page_count: Option<u32>,
    pub purchase_price: Option<f64>,
    /// Number of physical copies owned
    pub total_copies: u32,
    /// Copies currently on the shelf; always within `[0, total_copies]`
    pub available_copies: u32,
    /// Category names; every entry also exists in the document's category set
    pub categories: Vec<String>,
    pub note: Option<String>,
    /// Opaque path issued by the cover-image collaborator
    pub cover_image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a new book with the given title and author
    ///
    /// Starts with a single copy on the shelf; repositories overwrite the
    /// copy counts from the validated payload.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            isbn: None,
            publisher: None,
            publish_year: None,
            page_count: None,
            purchase_price: None,
            total_copies: 1,
            available_copies: 1,
            categories: Vec::new(),
            note: None,
            cover_image_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A registered library member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier
    pub id: Uuid,
    pub name: String,
    /// Unique (case-insensitive) among members when present
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member with the given name
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            phone: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lifecycle state of a loan
///
/// `Borrowed` is the only state a loan can be created in; `Returned` is
/// terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

/// A lending record tying one book to one member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Unique identifier
    pub id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Set exactly once, on the transition to `Returned`
    pub returned_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Create a new borrowed loan for the given book and member
    pub fn new(book_id: Uuid, member_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            book_id,
            member_id,
            loan_date: now,
            due_date: None,
            status: LoanStatus::Borrowed,
            returned_at: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this loan is still out
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Borrowed
    }
}
