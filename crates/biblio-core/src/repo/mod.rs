//! Entity repositories
//!
//! Typed CRUD and validation over one collection each, built on the
//! store's transaction primitive. Every `create`/`update` runs inside
//! exactly one transaction, so uniqueness checks observe the state they
//! commit against.

pub mod books;
pub mod loans;
pub mod members;

pub use books::{BookPatch, BookRepository, NewBook};
pub use loans::{LoanRepository, NewLoan};
pub use members::{MemberPatch, MemberRepository, NewMember};
