//! Kind-specific reverse lookups and inventory entry points.

use super::crud::CrudService;
use crate::error::DomainResult;
use crate::inventory::{InventoryController, QuantityAdjustment};
use crate::model::{
    AdminId, Blood, BloodBank, BloodBankForeignKey, BloodBankId, BloodForeignKey, Donor,
    DonorForeignKey, DonorId, EmployeeTeamId, EntityId, Hospital, HospitalForeignKey, Patient,
    PatientForeignKey, PatientId,
};
use crate::repo::Repository;

impl CrudService<'_, Blood> {
    /// Units stored in `blood_bank_id`.
    pub fn list_by_blood_bank(&self, blood_bank_id: &BloodBankId) -> DomainResult<Vec<Blood>> {
        Ok(self
            .repo()
            .list_by_foreign_key(BloodForeignKey::StoredIn, blood_bank_id.as_str())?)
    }

    /// Units donated by `donor_id`.
    pub fn list_by_donor(&self, donor_id: &DonorId) -> DomainResult<Vec<Blood>> {
        Ok(self
            .repo()
            .list_by_foreign_key(BloodForeignKey::DonatedBy, donor_id.as_str())?)
    }

    /// Units received by `patient_id`.
    pub fn list_by_patient(&self, patient_id: &PatientId) -> DomainResult<Vec<Blood>> {
        Ok(self
            .repo()
            .list_by_foreign_key(BloodForeignKey::ReceivedBy, patient_id.as_str())?)
    }
}

impl CrudService<'_, Hospital> {
    /// Hospitals contacting `blood_bank_id`.
    pub fn list_by_blood_bank(&self, blood_bank_id: &BloodBankId) -> DomainResult<Vec<Hospital>> {
        Ok(self.repo().list_by_foreign_key(
            HospitalForeignKey::ContactedBloodBank,
            blood_bank_id.as_str(),
        )?)
    }
}

impl CrudService<'_, Donor> {
    pub fn list_by_employee_team(&self, team_id: &EmployeeTeamId) -> DomainResult<Vec<Donor>> {
        Ok(self
            .repo()
            .list_by_foreign_key(DonorForeignKey::RegisteredBy, team_id.as_str())?)
    }
}

impl CrudService<'_, Patient> {
    pub fn list_by_employee_team(&self, team_id: &EmployeeTeamId) -> DomainResult<Vec<Patient>> {
        Ok(self
            .repo()
            .list_by_foreign_key(PatientForeignKey::RegisteredBy, team_id.as_str())?)
    }
}

impl CrudService<'_, BloodBank> {
    /// The bank managed by `admin_id`, if any.
    pub fn find_by_admin(&self, admin_id: &AdminId) -> DomainResult<Option<BloodBank>> {
        let mut banks = self
            .repo()
            .list_by_foreign_key(BloodBankForeignKey::Admin, admin_id.as_str())?;
        Ok(if banks.is_empty() {
            None
        } else {
            Some(banks.swap_remove(0))
        })
    }

    /// Adds `delta` to the bank's quantity under its lock slot.
    pub fn adjust_quantity(
        &self,
        blood_bank_id: &BloodBankId,
        delta: i64,
    ) -> DomainResult<QuantityAdjustment> {
        InventoryController::new(self.conn, self.locks).adjust_quantity(blood_bank_id, delta)
    }
}
