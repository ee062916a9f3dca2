//! body-store - record storage for bodylogger
//!
//! A `RecordStore` holds one user's weight and run records, keyed by date.
//! The SQLite backend keeps one file per user; the memory backend behaves the
//! same and exists for tests.

pub mod traits;

#[cfg(feature = "sqlite-backend")]
pub mod sqlite_impl;
#[cfg(feature = "sqlite-backend")]
pub mod users;

#[cfg(feature = "memory-backend")]
pub mod memory_impl;

pub use traits::{Entry, EntryKind, RecordStore, UpsertOutcome};

#[cfg(feature = "sqlite-backend")]
pub use sqlite_impl::SqliteRecordStore;
#[cfg(feature = "sqlite-backend")]
pub use users::UserDirectory;

#[cfg(feature = "memory-backend")]
pub use memory_impl::MemoryRecordStore;
