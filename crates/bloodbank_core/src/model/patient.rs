//! Patient entity.
//!
//! # Invariants
//! - `registered_by` must point at an existing employee team.
//! - `contact_number` is unique across patients.
//! - `intake_date` is not in the future.

use super::ids::{EmployeeTeamId, PatientId};
use super::validation::{ContactFormat, ValidationReport};
use super::{Entity, EntityKind, ForeignKeyField, Reference, UniqueField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub contact_number: String,
    pub blood_group: String,
    /// Unix epoch milliseconds.
    pub intake_date: Option<i64>,
    pub registered_by: EmployeeTeamId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientForeignKey {
    RegisteredBy,
}

impl ForeignKeyField for PatientForeignKey {
    fn column(self) -> &'static str {
        match self {
            Self::RegisteredBy => "registered_by",
        }
    }

    fn target(self) -> EntityKind {
        match self {
            Self::RegisteredBy => EntityKind::EmployeeTeam,
        }
    }
}

impl Patient {
    pub fn new(
        id: PatientId,
        name: impl Into<String>,
        contact_number: impl Into<String>,
        blood_group: impl Into<String>,
        registered_by: EmployeeTeamId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            gender: None,
            address: None,
            contact_number: contact_number.into(),
            blood_group: blood_group.into(),
            intake_date: None,
            registered_by,
        }
    }
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;
    type Id = PatientId;
    type ForeignKey = PatientForeignKey;

    fn id(&self) -> &PatientId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("name", &self.name, 1, 50);
        report.optional_text("gender", self.gender.as_deref(), 10);
        report.optional_text("address", self.address.as_deref(), 255);
        report.contact(
            "contact_number",
            &self.contact_number,
            ContactFormat::TenToFifteenDigits,
        );
        report.text("blood_group", &self.blood_group, 1, 10);
        report.not_in_future("intake_date", self.intake_date);
        report.finish()
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(PatientForeignKey::RegisteredBy, &self.registered_by)]
    }

    fn unique_fields(&self) -> Vec<UniqueField> {
        vec![UniqueField {
            column: "contact_number",
            value: self.contact_number.clone(),
        }]
    }
}
