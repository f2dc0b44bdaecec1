//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the uniform per-kind data access contract.
//! - Isolate SQLite query details from integrity and service orchestration.
//!
//! # Invariants
//! - `put` is insert-or-full-replace; it never merges fields.
//! - `delete` of an absent key is a no-op, not an error.
//! - Reverse relationships are answered by `list_by_foreign_key`, never by
//!   collections stored on entities.

use crate::db::DbError;
use crate::model::Entity;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod records;
pub mod sqlite_repo;

pub use records::SqliteRecord;
pub use sqlite_repo::{ensure_connection_ready, SqliteRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted row cannot be converted to a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Uniform repository contract for one entity kind.
pub trait Repository<E: Entity> {
    /// Loads one entity by key.
    fn get(&self, id: &E::Id) -> RepoResult<Option<E>>;
    /// Inserts when the key is absent, otherwise replaces every field.
    fn put(&self, entity: &E) -> RepoResult<()>;
    /// Deletes by key. Returns whether a row was removed.
    fn delete(&self, id: &E::Id) -> RepoResult<bool>;
    /// Lists every entity of this kind, ordered by identifier.
    fn list_all(&self) -> RepoResult<Vec<E>>;
    /// Lists entities whose foreign key `field` equals `value`.
    fn list_by_foreign_key(&self, field: E::ForeignKey, value: &str) -> RepoResult<Vec<E>>;
}
