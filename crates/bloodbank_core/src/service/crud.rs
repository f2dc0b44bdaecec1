//! Generic per-kind use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/get/list entry points for every entity kind.
//! - Route every write through validation, the integrity checks and the
//!   cascade rules inside one immediate transaction.
//!
//! # Invariants
//! - A failed call leaves the store unchanged.
//! - `update` never moves a blood bank's quantity; only the inventory
//!   controller does.

use crate::db::immediate_transaction;
use crate::error::{DomainError, DomainResult};
use crate::integrity::{check_write, Cascade, CascadeReport};
use crate::inventory::QuantityLocks;
use crate::model::{
    Admin, Blood, BloodBank, BloodBankId, Donor, EmployeeTeam, EntityId, Hospital, Patient,
};
use crate::repo::sqlite_repo::max_sequence;
use crate::repo::{Repository, SqliteRecord, SqliteRepository};
use log::{error, info, warn};
use rusqlite::Connection;
use std::marker::PhantomData;
use std::time::Instant;

/// Kind-specific write hooks used by `CrudService`.
pub trait ManagedEntity: SqliteRecord + Cascade {
    /// Bank whose quantity lock is held while this entity is rewritten.
    fn quantity_lock(&self) -> Option<&BloodBankId> {
        None
    }

    /// Copies fields that `update` must not change from the stored version.
    fn carry_forward(&mut self, _stored: &Self) {}
}

impl ManagedEntity for BloodBank {
    fn quantity_lock(&self) -> Option<&BloodBankId> {
        Some(&self.id)
    }

    fn carry_forward(&mut self, stored: &Self) {
        self.quantity = stored.quantity;
    }
}

impl ManagedEntity for Admin {}
impl ManagedEntity for Blood {}
impl ManagedEntity for Donor {}
impl ManagedEntity for Patient {}
impl ManagedEntity for EmployeeTeam {}
impl ManagedEntity for Hospital {}

/// Use-case service for entity kind `E` on one connection.
pub struct CrudService<'a, E> {
    pub(crate) conn: &'a Connection,
    pub(crate) locks: &'a QuantityLocks,
    _kind: PhantomData<fn() -> E>,
}

impl<'a, E: ManagedEntity> CrudService<'a, E> {
    pub(crate) fn new(conn: &'a Connection, locks: &'a QuantityLocks) -> Self {
        Self {
            conn,
            locks,
            _kind: PhantomData,
        }
    }

    pub(crate) fn repo(&self) -> SqliteRepository<'a, E> {
        SqliteRepository::new(self.conn)
    }

    /// Persists a new entity.
    ///
    /// # Errors
    /// - `DuplicateKey` with field `id` when the identifier is taken.
    /// - `Validation`, `DanglingReference` or `DuplicateKey` from the write
    ///   checks.
    pub fn create(&self, entity: &E) -> DomainResult<()> {
        let started_at = Instant::now();
        let result = immediate_transaction(self.conn, |tx| {
            let repo = SqliteRepository::<E>::new(tx);
            if repo.get(entity.id())?.is_some() {
                let id = entity.id().to_string();
                return Err(DomainError::DuplicateKey {
                    kind: E::KIND,
                    field: "id",
                    value: id.clone(),
                    existing_id: id,
                });
            }
            check_write(tx, entity, None)?;
            repo.put(entity)?;
            Ok(())
        });
        log_outcome::<E, _>("entity_create", entity.id(), started_at, &result);
        result
    }

    /// Replaces an existing entity.
    ///
    /// Only references that changed are re-resolved. For blood banks the
    /// stored quantity is kept regardless of the value passed in.
    pub fn update(&self, entity: &E) -> DomainResult<()> {
        let started_at = Instant::now();
        let result = match entity.quantity_lock() {
            Some(bank) => self.locks.with_lock(bank, || self.write_update(entity)),
            None => self.write_update(entity),
        };
        log_outcome::<E, _>("entity_update", entity.id(), started_at, &result);
        result
    }

    fn write_update(&self, entity: &E) -> DomainResult<()> {
        immediate_transaction(self.conn, |tx| {
            let repo = SqliteRepository::<E>::new(tx);
            let stored = repo
                .get(entity.id())?
                .ok_or_else(|| DomainError::not_found(E::KIND, entity.id().to_string()))?;
            let mut next = entity.clone();
            next.carry_forward(&stored);
            check_write(tx, &next, Some(&stored))?;
            repo.put(&next)?;
            Ok(())
        })
    }

    /// Deletes by identifier and applies the kind's cascade rule.
    ///
    /// Deleting an absent identifier succeeds with `existed == false`.
    pub fn delete(&self, id: &E::Id) -> DomainResult<CascadeReport> {
        let started_at = Instant::now();
        let result = immediate_transaction(self.conn, |tx| E::delete_cascading(tx, id));
        log_outcome::<E, _>("entity_delete", id, started_at, &result);
        if let Ok(report) = &result {
            if report.existed {
                info!(
                    "event=entity_cascade module=service status=ok kind={} id={} blood_banks_removed={} blood_units_removed={} hospitals_removed={} donor_links_cleared={} patient_links_cleared={}",
                    E::KIND,
                    id,
                    report.blood_banks_removed,
                    report.blood_units_removed,
                    report.hospitals_removed,
                    report.donor_links_cleared,
                    report.patient_links_cleared
                );
            }
        }
        result
    }

    /// Loads one entity.
    pub fn get_by_id(&self, id: &E::Id) -> DomainResult<E> {
        self.repo()
            .get(id)?
            .ok_or_else(|| DomainError::not_found(E::KIND, id.to_string()))
    }

    /// Parses `raw` as this kind's identifier, then loads it.
    pub fn get_by_raw_id(&self, raw: &str) -> DomainResult<E> {
        let id = E::Id::parse(raw)?;
        self.get_by_id(&id)
    }

    pub fn list_all(&self) -> DomainResult<Vec<E>> {
        Ok(self.repo().list_all()?)
    }

    /// Next free identifier: the prefix followed by one more than the largest
    /// suffix in use.
    pub fn next_id(&self) -> DomainResult<E::Id> {
        let max = max_sequence(self.conn, E::KIND)?;
        let next = max.checked_add(1).ok_or_else(|| {
            DomainError::InvalidData(format!("{} id sequence exhausted", E::KIND))
        })?;
        Ok(E::Id::from_sequence(next)?)
    }
}

fn log_outcome<E: ManagedEntity, T>(
    event: &str,
    id: &E::Id,
    started_at: Instant,
    result: &DomainResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={} module=service status=ok kind={} id={} duration_ms={}",
            event,
            E::KIND,
            id,
            duration_ms
        ),
        Err(DomainError::StorageUnavailable(err)) => error!(
            "event={} module=service status=error kind={} id={} duration_ms={} error_code=storage_unavailable error={}",
            event,
            E::KIND,
            id,
            duration_ms,
            err
        ),
        Err(err) => warn!(
            "event={} module=service status=rejected kind={} id={} duration_ms={} error_code={}",
            event,
            E::KIND,
            id,
            duration_ms,
            err.code()
        ),
    }
}
