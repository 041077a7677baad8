//! The root library document
//!
//! `LibraryDocument` is the single persisted structure holding every
//! collection. It is the unit of atomicity: a store transaction reads and
//! rewrites the whole document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Book, Loan, Member};

/// Everything the library persists, in one structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryDocument {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    /// Flat set of category names, referenced by books
    pub categories: Vec<String>,
}

impl LibraryDocument {
    pub fn book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn book_mut(&mut self, id: Uuid) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn member_mut(&mut self, id: Uuid) -> Option<&mut Member> {
        self.members.iter_mut().find(|member| member.id == id)
    }

    pub fn loan(&self, id: Uuid) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.id == id)
    }

    pub fn loan_mut(&mut self, id: Uuid) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|loan| loan.id == id)
    }

    /// Find the active (borrowed) loan for a (book, member) pair, if any
    pub fn active_loan(&self, book_id: Uuid, member_id: Uuid) -> Option<&Loan> {
        self.loans
            .iter()
            .find(|loan| loan.book_id == book_id && loan.member_id == member_id && loan.is_active())
    }

    /// Whether any copy of the book is currently out
    pub fn book_has_active_loan(&self, book_id: Uuid) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.book_id == book_id && loan.is_active())
    }

    /// Whether another book (not `except`) already carries this ISBN
    pub fn isbn_taken(&self, isbn: &str, except: Option<Uuid>) -> bool {
        self.books.iter().any(|book| {
            Some(book.id) != except && book.isbn.as_deref() == Some(isbn)
        })
    }

    /// Whether another member (not `except`) already uses this email,
    /// compared case-insensitively
    pub fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        let folded = email.to_lowercase();
        self.members.iter().any(|member| {
            Some(member.id) != except
                && member
                    .email
                    .as_deref()
                    .is_some_and(|existing| existing.to_lowercase() == folded)
        })
    }

    /// Union the given names into the category set, preserving insertion order
    pub fn ensure_categories<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if !self.categories.iter().any(|existing| existing == name) {
                self.categories.push(name.to_string());
            }
        }
    }
}
