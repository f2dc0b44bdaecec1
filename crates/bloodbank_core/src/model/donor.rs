//! Donor entity.
//!
//! # Invariants
//! - `registered_by` must point at an existing employee team.
//! - `contact_number` is unique across donors.
//! - `age` is within `18..=100`.

use super::ids::{DonorId, EmployeeTeamId};
use super::validation::{ContactFormat, ValidationReport};
use super::{Entity, EntityKind, ForeignKeyField, Reference, UniqueField};
use serde::{Deserialize, Serialize};

pub const MIN_DONOR_AGE: i64 = 18;
pub const MAX_DONOR_AGE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub contact_number: String,
    pub age: i64,
    pub blood_group: String,
    /// Unix epoch milliseconds.
    pub donation_date: Option<i64>,
    pub registered_by: EmployeeTeamId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorForeignKey {
    RegisteredBy,
}

impl ForeignKeyField for DonorForeignKey {
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

impl Donor {
    pub fn new(
        id: DonorId,
        name: impl Into<String>,
        contact_number: impl Into<String>,
        age: i64,
        blood_group: impl Into<String>,
        registered_by: EmployeeTeamId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            gender: None,
            address: None,
            contact_number: contact_number.into(),
            age,
            blood_group: blood_group.into(),
            donation_date: None,
            registered_by,
        }
    }
}

impl Entity for Donor {
    const KIND: EntityKind = EntityKind::Donor;
    type Id = DonorId;
    type ForeignKey = DonorForeignKey;

    fn id(&self) -> &DonorId {
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
            ContactFormat::TenDigits,
        );
        report.range("age", self.age, MIN_DONOR_AGE, MAX_DONOR_AGE);
        report.text("blood_group", &self.blood_group, 1, 10);
        report.finish()
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(DonorForeignKey::RegisteredBy, &self.registered_by)]
    }

    fn unique_fields(&self) -> Vec<UniqueField> {
        vec![UniqueField {
            column: "contact_number",
            value: self.contact_number.clone(),
        }]
    }
}
