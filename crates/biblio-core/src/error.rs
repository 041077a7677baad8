//! Library error taxonomy
//!
//! Every fallible operation in the repositories and the service reports a
//! `LibraryError`. Failed operations leave durable state untouched: a
//! transaction that returns an error is never persisted.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Errors surfaced by repository and service operations
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Malformed or missing required input
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no book found with id {0}")]
    BookNotFound(Uuid),

    #[error("no member found with id {0}")]
    MemberNotFound(Uuid),

    #[error("no loan found with id {0}")]
    LoanNotFound(Uuid),

    /// Another book already carries this ISBN
    #[error("a book with ISBN {0} is already registered")]
    DuplicateIsbn(String),

    /// Another member already uses this email (case-insensitive)
    #[error("a member with email {0} is already registered")]
    DuplicateEmail(String),

    /// The member already has this book out
    #[error("member already has an active loan for this book")]
    LoanAlreadyActive,

    /// No copies left on the shelf
    #[error("no available copies of this book")]
    OutOfStock,

    /// The loan was already returned; the transition is one-way
    #[error("loan has already been returned")]
    AlreadyReturned,

    /// A book with borrowed copies cannot be deleted
    #[error("book cannot be deleted while it is on loan")]
    BookOnLoan,

    /// The mutation would break an internal consistency rule
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Coarse classification of a `LibraryError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InvariantViolation,
    Storage,
}

impl LibraryError {
    /// The coarse class of this error
    ///
    /// Out-of-stock and already-returned are conflicts: a liveness rule
    /// blocked the request, and the caller must not retry blindly.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::Validation(_) => ErrorKind::Validation,
            LibraryError::BookNotFound(_)
            | LibraryError::MemberNotFound(_)
            | LibraryError::LoanNotFound(_) => ErrorKind::NotFound,
            LibraryError::DuplicateIsbn(_)
            | LibraryError::DuplicateEmail(_)
            | LibraryError::LoanAlreadyActive
            | LibraryError::OutOfStock
            | LibraryError::AlreadyReturned
            | LibraryError::BookOnLoan => ErrorKind::Conflict,
            LibraryError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            LibraryError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            LibraryError::Validation("empty name".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LibraryError::BookNotFound(Uuid::new_v4()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LibraryError::DuplicateIsbn("123".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(LibraryError::OutOfStock.kind(), ErrorKind::Conflict);
        assert_eq!(LibraryError::AlreadyReturned.kind(), ErrorKind::Conflict);
        assert_eq!(
            LibraryError::InvariantViolation("bounds".into()).kind(),
            ErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_display_includes_id() {
        let id = Uuid::new_v4();
        let msg = LibraryError::BookNotFound(id).to_string();
        assert!(msg.contains(&id.to_string()));
    }
}
