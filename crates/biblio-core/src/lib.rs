//! Biblio Core Library
//!
//! This crate provides the core functionality for Biblio, a small lending
//! library's inventory: books, members, loans, and categories, persisted
//! as a single JSON document on disk.
//!
//! # Architecture
//!
//! The document store is the single source of truth. Every mutation is a
//! transaction: one serialized read-transform-persist cycle over the
//! whole document, committed with an atomic file rename. Repositories
//! layer typed CRUD and validation on top; the service carries the
//! cross-entity workflows (lending, returning, deletion guards).
//!
//! # Quick Start
//!
//! ```text
//! let store = Arc::new(DocumentStore::open(config.library_path()).await?);
//! let library = LibraryService::new(store);
//!
//! let book = library.add_book(payload).await?;
//! let loan = library.lend_book(book.id, member.id, None, None).await?;
//! library.return_book(loan.id).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: transactional document store (main entry point)
//! - `document`: the persisted root document
//! - `models`: Book, Member, Loan
//! - `repo`: typed per-entity repositories
//! - `service`: cross-entity workflows and projections
//! - `storage`: atomic file persistence
//! - `config`: application configuration
//! - `metadata` / `covers`: interfaces consumed from the embedding shell

pub mod config;
pub mod covers;
pub mod document;
pub mod error;
pub mod metadata;
pub mod models;
pub mod normalize;
pub mod repo;
pub mod service;
pub mod storage;
pub mod store;

pub use config::Config;
pub use covers::CoverImageStore;
pub use document::LibraryDocument;
pub use error::{ErrorKind, LibraryError, LibraryResult};
pub use metadata::{BookMetadata, MetadataLookup};
pub use models::{Book, Loan, LoanStatus, Member};
pub use repo::{
    BookPatch, BookRepository, LoanRepository, MemberPatch, MemberRepository, NewBook, NewLoan,
    NewMember,
};
pub use service::{BookLoanRecord, LibraryService, MemberLoanRecord};
pub use storage::{DocumentPersistence, StorageError, StorageResult};
pub use store::DocumentStore;
