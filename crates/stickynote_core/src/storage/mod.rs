//! Durable key-value storage backends.
//!
//! # Responsibility
//! - Define the synchronous string key-value contract the note store
//!   persists through.
//! - Provide in-memory and SQLite implementations.
//!
//! # Invariants
//! - `set` fully overwrites any previous value for the key.
//! - Failures are returned as `StorageError`, never panics.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend failure while reading or writing one entry.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Value does not fit the backend's byte quota.
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded { key, size, quota } => write!(
                f,
                "storage quota exceeded for `{key}`: {size} bytes > {quota} bytes"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value store.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
