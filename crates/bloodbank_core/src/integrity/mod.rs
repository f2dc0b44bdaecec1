//! Referential integrity layer.
//!
//! # Responsibility
//! - Validate an entity's fields, resolve its foreign keys and check its
//!   unique columns before any write.
//! - Own the cascade rule table applied on delete (`cascade`).
//!
//! # Invariants
//! - Callers run these checks and the following write inside one
//!   transaction, so a rejected entity is never persisted.
//! - Optional references are checked only when present; `Entity::references`
//!   omits empty ones.

pub mod cascade;

pub use cascade::{Cascade, CascadeReport};

use crate::error::{DomainError, DomainResult};
use crate::model::{Entity, EntityId, Reference};
use crate::repo::sqlite_repo::{record_exists, unique_value_owner};
use log::warn;
use rusqlite::Connection;

/// Runs every write-time check for `entity`.
///
/// `previous` is the stored version on update; references it already held
/// are not re-resolved, only changed ones.
pub fn check_write<E: Entity>(
    conn: &Connection,
    entity: &E,
    previous: Option<&E>,
) -> DomainResult<()> {
    entity
        .validate()
        .map_err(|report| DomainError::Validation {
            kind: E::KIND,
            report,
        })?;

    let unchanged = previous.map(E::references).unwrap_or_default();
    for reference in entity.references() {
        if unchanged.contains(&reference) {
            continue;
        }
        ensure_reference_resolves::<E>(conn, &reference)?;
    }

    ensure_unique_fields(conn, entity)
}

fn ensure_reference_resolves<E: Entity>(
    conn: &Connection,
    reference: &Reference,
) -> DomainResult<()> {
    if record_exists(conn, reference.target, &reference.id)? {
        return Ok(());
    }

    warn!(
        "event=integrity_check module=integrity status=rejected kind={} field={} target={} error_code=dangling_reference",
        E::KIND,
        reference.field,
        reference.target
    );
    Err(DomainError::DanglingReference {
        kind: E::KIND,
        field: reference.field,
        target: reference.target,
        target_id: reference.id.clone(),
    })
}

fn ensure_unique_fields<E: Entity>(conn: &Connection, entity: &E) -> DomainResult<()> {
    let own_id = entity.id().as_str();
    for unique in entity.unique_fields() {
        if let Some(existing_id) =
            unique_value_owner(conn, E::KIND, unique.column, &unique.value, own_id)?
        {
            warn!(
                "event=integrity_check module=integrity status=rejected kind={} field={} error_code=duplicate_key",
                E::KIND,
                unique.column
            );
            return Err(DomainError::DuplicateKey {
                kind: E::KIND,
                field: unique.column,
                value: unique.value,
                existing_id,
            });
        }
    }
    Ok(())
}
