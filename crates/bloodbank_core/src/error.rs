//! Domain failure kinds surfaced by the service facade.
//!
//! # Invariants
//! - Every variant describes a rejected operation that left the store
//!   unchanged.
//! - Storage failures are surfaced as `StorageUnavailable` and never retried
//!   inside the engine.

use crate::model::{EntityKind, IdError, ValidationReport};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DomainResult<T> = Result<T, DomainError>;

/// Errors returned by facade, integrity and inventory operations.
#[derive(Debug)]
pub enum DomainError {
    /// Requested key is absent.
    NotFound { kind: EntityKind, id: String },
    /// A foreign key points at an entity that does not exist.
    DanglingReference {
        kind: EntityKind,
        field: &'static str,
        target: EntityKind,
        target_id: String,
    },
    /// Delete blocked while mandatory dependents still exist.
    ReferentialConflict {
        kind: EntityKind,
        id: String,
        dependents: Vec<(EntityKind, u64)>,
    },
    /// Quantity adjustment would drive the counter below zero.
    InsufficientStock {
        blood_bank_id: String,
        available: i64,
        requested: i64,
    },
    /// Quantity adjustment does not fit in the counter.
    QuantityOverflow {
        blood_bank_id: String,
        current: i64,
        delta: i64,
    },
    /// Create with an identifier already in use, or a unique field collision
    /// (`field` names the column, `id` for the primary key).
    DuplicateKey {
        kind: EntityKind,
        field: &'static str,
        value: String,
        existing_id: String,
    },
    /// Field-level validation failed.
    Validation {
        kind: EntityKind,
        report: ValidationReport,
    },
    /// Identifier does not match its kind's pattern.
    InvalidId(IdError),
    /// A persisted row could not be decoded.
    InvalidData(String),
    /// Backing store cannot be reached or failed mid-operation.
    StorageUnavailable(RepoError),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DanglingReference {
                kind,
                field,
                target,
                target_id,
            } => write!(
                f,
                "{kind}.{field} references missing {target} `{target_id}`"
            ),
            Self::ReferentialConflict {
                kind,
                id,
                dependents,
            } => {
                write!(f, "{kind} `{id}` is still referenced by")?;
                for (index, (dependent, count)) in dependents.iter().enumerate() {
                    let separator = if index == 0 { " " } else { ", " };
                    write!(f, "{separator}{count} {dependent}")?;
                }
                Ok(())
            }
            Self::InsufficientStock {
                blood_bank_id,
                available,
                requested,
            } => write!(
                f,
                "insufficient stock in {blood_bank_id}: {available} available, {requested} requested"
            ),
            Self::QuantityOverflow {
                blood_bank_id,
                current,
                delta,
            } => write!(
                f,
                "quantity overflow in {blood_bank_id}: {current} + {delta}"
            ),
            Self::DuplicateKey {
                kind,
                field,
                value,
                existing_id,
            } => write!(
                f,
                "{kind}.{field} `{value}` is already used by `{existing_id}`"
            ),
            Self::Validation { kind, report } => write!(f, "invalid {kind}: {report}"),
            Self::InvalidId(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation { report, .. } => Some(report),
            Self::InvalidId(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::InvalidData(message) => Self::InvalidData(message),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(value.into())
    }
}

impl From<IdError> for DomainError {
    fn from(value: IdError) -> Self {
        Self::InvalidId(value)
    }
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable snake_case code for log events and front ends.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::ReferentialConflict { .. } => "referential_conflict",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::QuantityOverflow { .. } => "quantity_overflow",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::Validation { .. } => "validation",
            Self::InvalidId(_) => "invalid_id",
            Self::InvalidData(_) => "invalid_data",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}
