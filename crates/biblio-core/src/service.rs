//! Library service
//!
//! Orchestrates the repositories to implement the cross-entity workflows:
//! lending, returning, deletion guards, category bookkeeping, and loan
//! history projections. Every workflow that touches more than one entity
//! runs inside a single store transaction, so its checks and mutations
//! commit together or not at all.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, Loan, LoanStatus, Member};
use crate::normalize;
use crate::repo::{BookPatch, BookRepository, LoanRepository, MemberRepository, MemberPatch, NewBook, NewMember};
use crate::store::DocumentStore;

/// One row of a member's loan history, annotated with book display fields
///
/// The book fields are null when the book has since been deleted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberLoanRecord {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub book_author: Option<String>,
    pub loan_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a book's loan history, annotated with member display fields
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookLoanRecord {
    pub loan_id: Uuid,
    pub member_id: Uuid,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub loan_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Service surface consumed by UI/CLI collaborators
pub struct LibraryService {
    store: Arc<DocumentStore>,
    books: BookRepository,
    members: MemberRepository,
    loans: LoanRepository,
}

impl LibraryService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            books: BookRepository::new(Arc::clone(&store)),
            members: MemberRepository::new(Arc::clone(&store)),
            loans: LoanRepository::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn books(&self) -> &BookRepository {
        &self.books
    }

    pub fn members(&self) -> &MemberRepository {
        &self.members
    }

    pub fn loans(&self) -> &LoanRepository {
        &self.loans
    }

    // ==================== Books ====================

    pub async fn list_books(&self) -> LibraryResult<Vec<Book>> {
        self.books.get_all().await
    }

    pub async fn get_book(&self, id: Uuid) -> LibraryResult<Book> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::BookNotFound(id))
    }

    pub async fn add_book(&self, payload: NewBook) -> LibraryResult<Book> {
        let book = self.books.create(payload).await?;
        info!(book_id = %book.id, title = %book.title, "added book");
        Ok(book)
    }

    pub async fn update_book(&self, id: Uuid, patch: BookPatch) -> LibraryResult<Book> {
        self.books.update(id, patch).await
    }

    /// Delete a book, guarded against active loans
    ///
    /// The not-found and on-loan checks run in the same transaction that
    /// removes the record, so a lend racing with the delete cannot slip
    /// between check and removal.
    pub async fn delete_book(&self, id: Uuid) -> LibraryResult<Book> {
        let mut removed: Option<Book> = None;
        self.store
            .write(|doc| {
                let index = doc
                    .books
                    .iter()
                    .position(|book| book.id == id)
                    .ok_or(LibraryError::BookNotFound(id))?;
                if doc.book_has_active_loan(id) {
                    return Err(LibraryError::BookOnLoan);
                }
                removed = Some(doc.books.remove(index));
                Ok(())
            })
            .await?;

        let book = removed.ok_or(LibraryError::BookNotFound(id))?;
        info!(book_id = %id, "deleted book");
        Ok(book)
    }

    // ==================== Members ====================

    pub async fn list_members(&self) -> LibraryResult<Vec<Member>> {
        self.members.get_all().await
    }

    pub async fn register_member(&self, payload: NewMember) -> LibraryResult<Member> {
        let member = self.members.create(payload).await?;
        info!(member_id = %member.id, "registered member");
        Ok(member)
    }

    pub async fn update_member(&self, id: Uuid, patch: MemberPatch) -> LibraryResult<Member> {
        self.members.update(id, patch).await
    }

    // ==================== Lending ====================

    pub async fn list_loans(&self) -> LibraryResult<Vec<Loan>> {
        self.loans.get_all().await
    }

    /// Lend one copy of a book to a member
    ///
    /// One transaction covers all of it: resolve book, check stock,
    /// resolve member, reject a second active loan for the same pair,
    /// decrement the shelf count, insert the loan.
    pub async fn lend_book(
        &self,
        book_id: Uuid,
        member_id: Uuid,
        due_date: Option<DateTime<Utc>>,
        note: Option<&str>,
    ) -> LibraryResult<Loan> {
        let mut loan = Loan::new(book_id, member_id);
        loan.due_date = due_date;
        loan.note = normalize::clean_text(note);

        let record = loan.clone();
        self.store
            .write(move |doc| {
                let book = doc.book(book_id).ok_or(LibraryError::BookNotFound(book_id))?;
                if book.available_copies < 1 {
                    return Err(LibraryError::OutOfStock);
                }
                if doc.member(member_id).is_none() {
                    return Err(LibraryError::MemberNotFound(member_id));
                }
                if doc.active_loan(book_id, member_id).is_some() {
                    return Err(LibraryError::LoanAlreadyActive);
                }

                let book = doc
                    .book_mut(book_id)
                    .ok_or(LibraryError::BookNotFound(book_id))?;
                book.available_copies -= 1;
                book.touch();
                doc.loans.push(record);
                Ok(())
            })
            .await?;

        info!(loan_id = %loan.id, book_id = %book_id, member_id = %member_id, "lent book");
        Ok(loan)
    }

    /// Return a loan and put the copy back on the shelf
    ///
    /// The increment clamps at `total_copies`: drift from any earlier
    /// inconsistency is corrected silently on the return path rather than
    /// surfaced as an error.
    pub async fn return_book(&self, loan_id: Uuid) -> LibraryResult<Loan> {
        let committed = self
            .store
            .write(move |doc| {
                let loan = doc.loan(loan_id).ok_or(LibraryError::LoanNotFound(loan_id))?;
                if loan.status == LoanStatus::Returned {
                    return Err(LibraryError::AlreadyReturned);
                }
                let book_id = loan.book_id;
                if doc.book(book_id).is_none() {
                    return Err(LibraryError::BookNotFound(book_id));
                }

                let now = Utc::now();
                let loan = doc
                    .loan_mut(loan_id)
                    .ok_or(LibraryError::LoanNotFound(loan_id))?;
                loan.status = LoanStatus::Returned;
                loan.returned_at = Some(now);
                loan.updated_at = now;

                let book = doc
                    .book_mut(book_id)
                    .ok_or(LibraryError::BookNotFound(book_id))?;
                book.available_copies = (book.available_copies + 1).min(book.total_copies);
                book.touch();
                Ok(())
            })
            .await?;

        info!(loan_id = %loan_id, "returned book");
        committed
            .loan(loan_id)
            .cloned()
            .ok_or(LibraryError::LoanNotFound(loan_id))
    }

    // ==================== History ====================

    /// All loans of a member, annotated with book display fields,
    /// newest activity first
    pub async fn member_loan_history(
        &self,
        member_id: Uuid,
    ) -> LibraryResult<Vec<MemberLoanRecord>> {
        let doc = self.store.read().await?;
        if doc.member(member_id).is_none() {
            return Err(LibraryError::MemberNotFound(member_id));
        }

        let mut records: Vec<MemberLoanRecord> = doc
            .loans
            .iter()
            .filter(|loan| loan.member_id == member_id)
            .map(|loan| {
                let book = doc.book(loan.book_id);
                MemberLoanRecord {
                    loan_id: loan.id,
                    book_id: loan.book_id,
                    book_title: book.map(|b| b.title.clone()),
                    book_author: book.map(|b| b.author.clone()),
                    loan_date: loan.loan_date,
                    due_date: loan.due_date,
                    returned_at: loan.returned_at,
                    status: loan.status,
                    note: loan.note.clone(),
                    updated_at: loan.updated_at,
                }
            })
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// All loans of a book, annotated with member display fields,
    /// newest activity first
    pub async fn book_loan_history(&self, book_id: Uuid) -> LibraryResult<Vec<BookLoanRecord>> {
        let doc = self.store.read().await?;
        if doc.book(book_id).is_none() {
            return Err(LibraryError::BookNotFound(book_id));
        }

        let mut records: Vec<BookLoanRecord> = doc
            .loans
            .iter()
            .filter(|loan| loan.book_id == book_id)
            .map(|loan| {
                let member = doc.member(loan.member_id);
                BookLoanRecord {
                    loan_id: loan.id,
                    member_id: loan.member_id,
                    member_name: member.map(|m| m.name.clone()),
                    member_email: member.and_then(|m| m.email.clone()),
                    loan_date: loan.loan_date,
                    due_date: loan.due_date,
                    returned_at: loan.returned_at,
                    status: loan.status,
                    note: loan.note.clone(),
                    updated_at: loan.updated_at,
                }
            })
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    // ==================== Categories ====================

    /// Category names sorted for display
    pub async fn list_categories(&self) -> LibraryResult<Vec<String>> {
        let doc = self.store.read().await?;
        let mut names = doc.categories;
        names.sort_by(|a, b| collate(a, b));
        Ok(names)
    }

    /// Add a category; re-adding an existing name is a no-op
    ///
    /// Returns the freshly sorted category list.
    pub async fn add_category(&self, name: &str) -> LibraryResult<Vec<String>> {
        let trimmed = normalize::required_text(name, "category name")?;
        self.store
            .write(move |doc| {
                doc.ensure_categories([trimmed.as_str()]);
                Ok::<_, LibraryError>(())
            })
            .await?;
        self.list_categories().await
    }
}

/// Display ordering for human-facing lists
///
/// Approximates natural-language collation without locale tables:
/// case-insensitive comparison with a byte-order tiebreak.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
