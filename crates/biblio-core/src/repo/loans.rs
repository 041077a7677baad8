//! Loan repository
//!
//! Loans are read-mostly at this layer. The lending workflow in
//! [`crate::service`] creates and closes loans inside its own combined
//! transactions, because the stock movement on the book must commit
//! together with the loan change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Loan, LoanStatus};
use crate::normalize;
use crate::store::DocumentStore;

/// Payload for inserting a loan record directly
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub book_id: Uuid,
    pub member_id: Uuid,
    /// Defaults to now
    pub loan_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Typed access to the `loans` collection
pub struct LoanRepository {
    store: Arc<DocumentStore>,
}

impl LoanRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> LibraryResult<Vec<Loan>> {
        Ok(self.store.read().await?.loans)
    }

    pub async fn find_by_id(&self, id: Uuid) -> LibraryResult<Option<Loan>> {
        Ok(self.store.read().await?.loan(id).cloned())
    }

    /// The borrowed loan for this (book, member) pair, if one exists
    pub async fn find_active_loan(
        &self,
        book_id: Uuid,
        member_id: Uuid,
    ) -> LibraryResult<Option<Loan>> {
        let doc = self.store.read().await?;
        Ok(doc.active_loan(book_id, member_id).cloned())
    }

    /// Insert a loan record in the `borrowed` state
    pub async fn create(&self, payload: NewLoan) -> LibraryResult<Loan> {
        let mut loan = Loan::new(payload.book_id, payload.member_id);
        if let Some(date) = payload.loan_date {
            loan.loan_date = date;
        }
        loan.due_date = payload.due_date;
        loan.note = normalize::clean_text(payload.note.as_deref());

        let record = loan.clone();
        self.store
            .write(move |doc| {
                doc.loans.push(record);
                Ok::<_, LibraryError>(())
            })
            .await?;

        Ok(loan)
    }

    /// Close a loan; the `borrowed` to `returned` transition is one-way
    pub async fn mark_returned(&self, id: Uuid) -> LibraryResult<Loan> {
        let committed = self
            .store
            .write(move |doc| {
                let loan = doc.loan_mut(id).ok_or(LibraryError::LoanNotFound(id))?;
                if loan.status == LoanStatus::Returned {
                    return Err(LibraryError::AlreadyReturned);
                }
                let now = Utc::now();
                loan.status = LoanStatus::Returned;
                loan.returned_at = Some(now);
                loan.updated_at = now;
                Ok(())
            })
            .await?;

        committed
            .loan(id)
            .cloned()
            .ok_or(LibraryError::LoanNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    async fn repo(temp_dir: &TempDir) -> LoanRepository {
        let store = DocumentStore::open(temp_dir.path().join("library.json"))
            .await
            .unwrap();
        LoanRepository::new(Arc::new(store))
    }

    fn new_loan() -> NewLoan {
        NewLoan {
            book_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            loan_date: None,
            due_date: None,
            note: Some("  handle with care  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_starts_borrowed() {
        let temp_dir = TempDir::new().unwrap();
        let loans = repo(&temp_dir).await;

        let loan = loans.create(new_loan()).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Borrowed);
        assert!(loan.returned_at.is_none());
        assert_eq!(loan.note.as_deref(), Some("handle with care"));

        let found = loans.find_by_id(loan.id).await.unwrap().unwrap();
        assert_eq!(found, loan);
    }

    #[tokio::test]
    async fn test_find_active_loan() {
        let temp_dir = TempDir::new().unwrap();
        let loans = repo(&temp_dir).await;

        let loan = loans.create(new_loan()).await.unwrap();
        let active = loans
            .find_active_loan(loan.book_id, loan.member_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, loan.id);

        loans.mark_returned(loan.id).await.unwrap();
        assert!(loans
            .find_active_loan(loan.book_id, loan.member_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_mark_returned_stamps_and_closes() {
        let temp_dir = TempDir::new().unwrap();
        let loans = repo(&temp_dir).await;

        let loan = loans.create(new_loan()).await.unwrap();
        let returned = loans.mark_returned(loan.id).await.unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert!(returned.returned_at.is_some());
        assert_eq!(returned.updated_at, returned.returned_at.unwrap());
    }

    #[tokio::test]
    async fn test_mark_returned_twice_conflicts() {
        let temp_dir = TempDir::new().unwrap();
        let loans = repo(&temp_dir).await;

        let loan = loans.create(new_loan()).await.unwrap();
        loans.mark_returned(loan.id).await.unwrap();

        let err = loans.mark_returned(loan.id).await.unwrap_err();
        assert!(matches!(err, LibraryError::AlreadyReturned));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_mark_returned_unknown_loan() {
        let temp_dir = TempDir::new().unwrap();
        let loans = repo(&temp_dir).await;

        let err = loans.mark_returned(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
