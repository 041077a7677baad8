//! Document persistence
//!
//! File-level concerns for the library document: atomic writes, first-use
//! bootstrap, and typed storage errors. The transactional surface lives in
//! [`crate::store`].

mod error;
mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::DocumentPersistence;
