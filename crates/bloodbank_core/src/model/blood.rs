//! Blood unit entity.
//!
//! # Invariants
//! - `stored_in` is mandatory.
//! - `donated_by` and `received_by` are optional and cleared, not deleted,
//!   when their donor/patient goes away.

use super::ids::{BloodBankId, BloodId, DonorId, PatientId};
use super::validation::ValidationReport;
use super::{Entity, EntityKind, ForeignKeyField, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blood {
    pub id: BloodId,
    pub blood_group: String,
    pub stored_in: BloodBankId,
    pub donated_by: Option<DonorId>,
    pub received_by: Option<PatientId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodForeignKey {
    StoredIn,
    DonatedBy,
    ReceivedBy,
}

impl ForeignKeyField for BloodForeignKey {
    fn column(self) -> &'static str {
        match self {
            Self::StoredIn => "stored_in",
            Self::DonatedBy => "donated_by",
            Self::ReceivedBy => "received_by",
        }
    }

    fn target(self) -> EntityKind {
        match self {
            Self::StoredIn => EntityKind::BloodBank,
            Self::DonatedBy => EntityKind::Donor,
            Self::ReceivedBy => EntityKind::Patient,
        }
    }
}

impl Blood {
    pub fn new(id: BloodId, blood_group: impl Into<String>, stored_in: BloodBankId) -> Self {
        Self {
            id,
            blood_group: blood_group.into(),
            stored_in,
            donated_by: None,
            received_by: None,
        }
    }
}

impl Entity for Blood {
    const KIND: EntityKind = EntityKind::Blood;
    type Id = BloodId;
    type ForeignKey = BloodForeignKey;

    fn id(&self) -> &BloodId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("blood_group", &self.blood_group, 1, 10);
        report.finish()
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![Reference::new(BloodForeignKey::StoredIn, &self.stored_in)];
        if let Some(donor) = &self.donated_by {
            references.push(Reference::new(BloodForeignKey::DonatedBy, donor));
        }
        if let Some(patient) = &self.received_by {
            references.push(Reference::new(BloodForeignKey::ReceivedBy, patient));
        }
        references
    }
}
