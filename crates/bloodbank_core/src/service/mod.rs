//! Core use-case services.
//!
//! # Responsibility
//! - Expose one CRUD service per entity kind plus the inventory controller
//!   behind a single facade bound to a connection.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - The facade only accepts connections that are migrated and carry every
//!   required table.
//! - Facades that should serialize quantity updates across threads share one
//!   `QuantityLocks` through `with_locks`.

pub mod crud;
mod lookups;

pub use crud::{CrudService, ManagedEntity};

use crate::error::DomainResult;
use crate::inventory::{InventoryController, QuantityAdjustment, QuantityLocks};
use crate::model::{
    Admin, Blood, BloodBank, BloodBankId, Donor, EmployeeTeam, EntityKind, Hospital, Patient,
};
use crate::repo::ensure_connection_ready;
use crate::repo::sqlite_repo::count_all;
use rusqlite::Connection;
use std::sync::Arc;

pub type AdminService<'a> = CrudService<'a, Admin>;
pub type BloodBankService<'a> = CrudService<'a, BloodBank>;
pub type BloodService<'a> = CrudService<'a, Blood>;
pub type DonorService<'a> = CrudService<'a, Donor>;
pub type PatientService<'a> = CrudService<'a, Patient>;
pub type EmployeeTeamService<'a> = CrudService<'a, EmployeeTeam>;
pub type HospitalService<'a> = CrudService<'a, Hospital>;

/// Domain service facade over one SQLite connection.
pub struct BloodBankSystem<'conn> {
    conn: &'conn Connection,
    locks: Arc<QuantityLocks>,
}

impl<'conn> BloodBankSystem<'conn> {
    /// Creates a facade with its own lock table.
    pub fn try_new(conn: &'conn Connection) -> DomainResult<Self> {
        Self::with_locks(conn, Arc::new(QuantityLocks::new()))
    }

    /// Creates a facade sharing `locks` with other facades.
    pub fn with_locks(conn: &'conn Connection, locks: Arc<QuantityLocks>) -> DomainResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, locks })
    }

    pub fn locks(&self) -> &Arc<QuantityLocks> {
        &self.locks
    }

    pub fn admins(&self) -> AdminService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn blood_banks(&self) -> BloodBankService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn blood_units(&self) -> BloodService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn donors(&self) -> DonorService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn patients(&self) -> PatientService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn employee_teams(&self) -> EmployeeTeamService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn hospitals(&self) -> HospitalService<'_> {
        CrudService::new(self.conn, &self.locks)
    }

    pub fn inventory(&self) -> InventoryController<'_> {
        InventoryController::new(self.conn, &self.locks)
    }

    /// Shorthand for `inventory().adjust_quantity(..)`.
    pub fn adjust_quantity(
        &self,
        blood_bank_id: &BloodBankId,
        delta: i64,
    ) -> DomainResult<QuantityAdjustment> {
        self.inventory().adjust_quantity(blood_bank_id, delta)
    }

    /// Row count per entity kind, in `EntityKind::ALL` order.
    pub fn entity_counts(&self) -> DomainResult<Vec<(EntityKind, u64)>> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, count_all(self.conn, kind)?)))
            .collect()
    }
}
