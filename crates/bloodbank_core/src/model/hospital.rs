//! Hospital entity. A hospital cannot exist without the blood bank it contacts.

use super::ids::{BloodBankId, HospitalId};
use super::validation::ValidationReport;
use super::{Entity, EntityKind, ForeignKeyField, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub location: String,
    pub contacted_blood_bank: BloodBankId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HospitalForeignKey {
    ContactedBloodBank,
}

impl ForeignKeyField for HospitalForeignKey {
    fn column(self) -> &'static str {
        match self {
            Self::ContactedBloodBank => "contacted_blood_bank",
        }
    }

    fn target(self) -> EntityKind {
        match self {
            Self::ContactedBloodBank => EntityKind::BloodBank,
        }
    }
}

impl Hospital {
    pub fn new(
        id: HospitalId,
        name: impl Into<String>,
        location: impl Into<String>,
        contacted_blood_bank: BloodBankId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            contacted_blood_bank,
        }
    }
}

impl Entity for Hospital {
    const KIND: EntityKind = EntityKind::Hospital;
    type Id = HospitalId;
    type ForeignKey = HospitalForeignKey;

    fn id(&self) -> &HospitalId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("name", &self.name, 1, 100);
        report.text("location", &self.location, 1, 255);
        report.finish()
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(HospitalForeignKey::ContactedBloodBank, &self.contacted_blood_bank)]
    }
}
