//! Cascade rules applied when an entity is deleted.
//!
//! | Deleted        | Effect on dependents                                   |
//! |----------------|--------------------------------------------------------|
//! | Admin          | deletes its managed blood bank (which cascades)        |
//! | BloodBank      | deletes stored blood units and contacting hospitals    |
//! | Donor          | clears `donated_by` on donated blood units             |
//! | Patient        | clears `received_by` on received blood units           |
//! | EmployeeTeam   | rejected while any donor or patient is registered      |
//! | Blood/Hospital | none                                                   |
//!
//! # Invariants
//! - Children are mutated before their parent is removed, so no mandatory
//!   reference dangles at any point inside the transaction.
//! - Callers hold an open transaction; every rule here either completes or
//!   returns an error that rolls the whole unit back.

use crate::error::{DomainError, DomainResult};
use crate::model::{
    Admin, AdminId, Blood, BloodBank, BloodBankForeignKey, BloodBankId, BloodForeignKey, BloodId,
    Donor, DonorForeignKey, DonorId, EmployeeTeam, EmployeeTeamId, Entity, EntityId, EntityKind,
    Hospital, HospitalForeignKey, HospitalId, Patient, PatientForeignKey, PatientId,
};
use crate::repo::sqlite_repo::count_by_foreign_key;
use crate::repo::{Repository, SqliteRepository};
use rusqlite::Connection;

/// What one delete call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// `false` when the target did not exist and nothing was done.
    pub existed: bool,
    pub admins_removed: u64,
    pub blood_banks_removed: u64,
    pub blood_units_removed: u64,
    pub hospitals_removed: u64,
    pub donors_removed: u64,
    pub patients_removed: u64,
    pub employee_teams_removed: u64,
    pub donor_links_cleared: u64,
    pub patient_links_cleared: u64,
}

impl CascadeReport {
    fn merge(&mut self, other: CascadeReport) {
        self.admins_removed += other.admins_removed;
        self.blood_banks_removed += other.blood_banks_removed;
        self.blood_units_removed += other.blood_units_removed;
        self.hospitals_removed += other.hospitals_removed;
        self.donors_removed += other.donors_removed;
        self.patients_removed += other.patients_removed;
        self.employee_teams_removed += other.employee_teams_removed;
        self.donor_links_cleared += other.donor_links_cleared;
        self.patient_links_cleared += other.patient_links_cleared;
    }
}

/// Kind-specific delete rule.
pub trait Cascade: Entity {
    /// Deletes `id` and applies this kind's rule to its dependents.
    fn delete_cascading(conn: &Connection, id: &Self::Id) -> DomainResult<CascadeReport>;
}

impl Cascade for Admin {
    fn delete_cascading(conn: &Connection, id: &AdminId) -> DomainResult<CascadeReport> {
        let admins = SqliteRepository::<Admin>::new(conn);
        if admins.get(id)?.is_none() {
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        let banks = SqliteRepository::<BloodBank>::new(conn);
        for bank in banks.list_by_foreign_key(BloodBankForeignKey::Admin, id.as_str())? {
            report.merge(BloodBank::delete_cascading(conn, &bank.id)?);
        }

        admins.delete(id)?;
        report.existed = true;
        report.admins_removed += 1;
        Ok(report)
    }
}

impl Cascade for BloodBank {
    fn delete_cascading(conn: &Connection, id: &BloodBankId) -> DomainResult<CascadeReport> {
        let banks = SqliteRepository::<BloodBank>::new(conn);
        if banks.get(id)?.is_none() {
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        let units = SqliteRepository::<Blood>::new(conn);
        for unit in units.list_by_foreign_key(BloodForeignKey::StoredIn, id.as_str())? {
            if units.delete(&unit.id)? {
                report.blood_units_removed += 1;
            }
        }

        let hospitals = SqliteRepository::<Hospital>::new(conn);
        for hospital in
            hospitals.list_by_foreign_key(HospitalForeignKey::ContactedBloodBank, id.as_str())?
        {
            if hospitals.delete(&hospital.id)? {
                report.hospitals_removed += 1;
            }
        }

        banks.delete(id)?;
        report.existed = true;
        report.blood_banks_removed += 1;
        Ok(report)
    }
}

impl Cascade for Donor {
    fn delete_cascading(conn: &Connection, id: &DonorId) -> DomainResult<CascadeReport> {
        let donors = SqliteRepository::<Donor>::new(conn);
        if donors.get(id)?.is_none() {
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        let units = SqliteRepository::<Blood>::new(conn);
        for mut unit in units.list_by_foreign_key(BloodForeignKey::DonatedBy, id.as_str())? {
            unit.donated_by = None;
            units.put(&unit)?;
            report.donor_links_cleared += 1;
        }

        donors.delete(id)?;
        report.existed = true;
        report.donors_removed += 1;
        Ok(report)
    }
}

impl Cascade for Patient {
    fn delete_cascading(conn: &Connection, id: &PatientId) -> DomainResult<CascadeReport> {
        let patients = SqliteRepository::<Patient>::new(conn);
        if patients.get(id)?.is_none() {
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        let units = SqliteRepository::<Blood>::new(conn);
        for mut unit in units.list_by_foreign_key(BloodForeignKey::ReceivedBy, id.as_str())? {
            unit.received_by = None;
            units.put(&unit)?;
            report.patient_links_cleared += 1;
        }

        patients.delete(id)?;
        report.existed = true;
        report.patients_removed += 1;
        Ok(report)
    }
}

impl Cascade for EmployeeTeam {
    fn delete_cascading(conn: &Connection, id: &EmployeeTeamId) -> DomainResult<CascadeReport> {
        let teams = SqliteRepository::<EmployeeTeam>::new(conn);
        if teams.get(id)?.is_none() {
            return Ok(CascadeReport::default());
        }

        let donors = count_by_foreign_key(
            conn,
            EntityKind::Donor,
            DonorForeignKey::RegisteredBy,
            id.as_str(),
        )?;
        let patients = count_by_foreign_key(
            conn,
            EntityKind::Patient,
            PatientForeignKey::RegisteredBy,
            id.as_str(),
        )?;
        if donors > 0 || patients > 0 {
            let dependents = [(EntityKind::Donor, donors), (EntityKind::Patient, patients)]
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .collect();
            return Err(DomainError::ReferentialConflict {
                kind: EntityKind::EmployeeTeam,
                id: id.to_string(),
                dependents,
            });
        }

        teams.delete(id)?;
        Ok(CascadeReport {
            existed: true,
            employee_teams_removed: 1,
            ..CascadeReport::default()
        })
    }
}

impl Cascade for Blood {
    fn delete_cascading(conn: &Connection, id: &BloodId) -> DomainResult<CascadeReport> {
        let removed = SqliteRepository::<Blood>::new(conn).delete(id)?;
        Ok(CascadeReport {
            existed: removed,
            blood_units_removed: u64::from(removed),
            ..CascadeReport::default()
        })
    }
}

impl Cascade for Hospital {
    fn delete_cascading(conn: &Connection, id: &HospitalId) -> DomainResult<CascadeReport> {
        let removed = SqliteRepository::<Hospital>::new(conn).delete(id)?;
        Ok(CascadeReport {
            existed: removed,
            hospitals_removed: u64::from(removed),
            ..CascadeReport::default()
        })
    }
}
