//! Blood bank domain model.
//!
//! # Responsibility
//! - Define the seven entity kinds, their typed identifiers and attributes.
//! - Declare each entity's outgoing foreign keys and unique columns so the
//!   integrity layer can check them without knowing the concrete type.
//!
//! # Invariants
//! - Relationships are one-directional: an entity stores the ids it points
//!   to, never a collection of the entities pointing at it.
//! - Identifiers are immutable once assigned.

pub mod admin;
pub mod blood;
pub mod blood_bank;
pub mod donor;
pub mod employee_team;
pub mod hospital;
pub mod ids;
pub mod patient;
pub mod validation;

pub use admin::Admin;
pub use blood::{Blood, BloodForeignKey};
pub use blood_bank::{normalize_blood_groups, BloodBank, BloodBankForeignKey};
pub use donor::{Donor, DonorForeignKey};
pub use employee_team::EmployeeTeam;
pub use hospital::{Hospital, HospitalForeignKey};
pub use ids::{
    AdminId, BloodBankId, BloodId, DonorId, EmployeeTeamId, EntityId, HospitalId, IdError,
    IdErrorReason, PatientId, MAX_ID_LEN,
};
pub use patient::{Patient, PatientForeignKey};
pub use validation::{FieldViolation, ValidationReport};

use std::fmt::{Debug, Display, Formatter};

/// The seven entity kinds tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Admin,
    BloodBank,
    Blood,
    Donor,
    Patient,
    EmployeeTeam,
    Hospital,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        Self::Admin,
        Self::BloodBank,
        Self::Blood,
        Self::Donor,
        Self::Patient,
        Self::EmployeeTeam,
        Self::Hospital,
    ];

    /// Storage table backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Admin => "admins",
            Self::BloodBank => "blood_banks",
            Self::Blood => "blood_units",
            Self::Donor => "donors",
            Self::Patient => "patients",
            Self::EmployeeTeam => "employee_teams",
            Self::Hospital => "hospitals",
        }
    }

    /// Fixed identifier prefix, e.g. `BB` for blood banks.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Admin => "A",
            Self::BloodBank => "BB",
            Self::Blood => "B",
            Self::Donor => "D",
            Self::Patient => "P",
            Self::EmployeeTeam => "E",
            Self::Hospital => "H",
        }
    }

    /// Stable snake_case name used in log events and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::BloodBank => "blood_bank",
            Self::Blood => "blood",
            Self::Donor => "donor",
            Self::Patient => "patient",
            Self::EmployeeTeam => "employee_team",
            Self::Hospital => "hospital",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed foreign key column of one entity kind.
pub trait ForeignKeyField: Copy + Debug {
    /// Storage column holding the referenced id.
    fn column(self) -> &'static str;
    /// Kind the column points at.
    fn target(self) -> EntityKind;
}

/// Foreign key type for kinds that reference nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoForeignKey {}

impl ForeignKeyField for NoForeignKey {
    fn column(self) -> &'static str {
        match self {}
    }

    fn target(self) -> EntityKind {
        match self {}
    }
}

/// One outgoing reference carried by an entity value.
///
/// Empty optional links (blood donor/patient, bank admin) produce no
/// `Reference` at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Column on the referencing entity.
    pub field: &'static str,
    pub target: EntityKind,
    pub id: String,
}

impl Reference {
    pub fn new<F: ForeignKeyField>(field: F, id: &impl EntityId) -> Self {
        Self {
            field: field.column(),
            target: field.target(),
            id: id.as_str().to_string(),
        }
    }
}

/// A column value that must be unique within the entity's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueField {
    pub column: &'static str,
    pub value: String,
}

/// Common contract implemented by every entity kind.
pub trait Entity: Clone + Debug {
    const KIND: EntityKind;
    type Id: EntityId;
    type ForeignKey: ForeignKeyField;

    fn id(&self) -> &Self::Id;

    /// Checks field-level rules and reports every violation found.
    fn validate(&self) -> Result<(), ValidationReport>;

    /// Outgoing references that must resolve at write time.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Values that must not collide with another entity of the same kind.
    fn unique_fields(&self) -> Vec<UniqueField> {
        Vec::new()
    }
}
