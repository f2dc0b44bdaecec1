//! Blood bank entity.
//!
//! # Invariants
//! - `quantity` is never negative.
//! - `available_blood_groups` holds trimmed, upper-cased, de-duplicated tags.
//! - At most one blood bank references a given admin.

use super::ids::{AdminId, BloodBankId};
use super::validation::ValidationReport;
use super::{Entity, EntityKind, ForeignKeyField, Reference, UniqueField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Separator used when the tag set is stored as one text column.
pub const BLOOD_GROUP_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodBank {
    pub id: BloodBankId,
    pub name: String,
    pub location: String,
    pub available_blood_groups: BTreeSet<String>,
    /// Units on hand. Changed only through the inventory controller.
    pub quantity: i64,
    /// Managing admin; empty until one is assigned.
    pub admin_id: Option<AdminId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodBankForeignKey {
    Admin,
}

impl ForeignKeyField for BloodBankForeignKey {
    fn column(self) -> &'static str {
        match self {
            Self::Admin => "admin_id",
        }
    }

    fn target(self) -> EntityKind {
        match self {
            Self::Admin => EntityKind::Admin,
        }
    }
}

impl BloodBank {
    pub fn new(id: BloodBankId, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            available_blood_groups: BTreeSet::new(),
            quantity: 0,
            admin_id: None,
        }
    }

    /// Stored text form of the tag set.
    pub fn joined_blood_groups(&self) -> String {
        let mut joined = String::new();
        for group in &self.available_blood_groups {
            if !joined.is_empty() {
                joined.push(BLOOD_GROUP_SEPARATOR);
            }
            joined.push_str(group);
        }
        joined
    }
}

/// Normalizes free-text blood group tags.
///
/// Tags are trimmed and upper-cased; blanks are dropped and duplicates merged.
pub fn normalize_blood_groups<I, S>(groups: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    groups
        .into_iter()
        .filter_map(|group| {
            let trimmed = group.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
        })
        .collect()
}

impl Entity for BloodBank {
    const KIND: EntityKind = EntityKind::BloodBank;
    type Id = BloodBankId;
    type ForeignKey = BloodBankForeignKey;

    fn id(&self) -> &BloodBankId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("name", &self.name, 1, 100);
        report.text("location", &self.location, 1, 255);
        if self.joined_blood_groups().chars().count() > 255 {
            report.push("available_blood_groups", "must be at most 255 characters");
        }
        if self
            .available_blood_groups
            .iter()
            .any(|group| group.contains(BLOOD_GROUP_SEPARATOR) || group.trim().is_empty())
        {
            report.push(
                "available_blood_groups",
                "tags must be non-blank and must not contain `,`",
            );
        } else if normalize_blood_groups(&self.available_blood_groups)
            != self.available_blood_groups
        {
            report.push("available_blood_groups", "tags must be trimmed and upper-case");
        }
        if self.quantity < 0 {
            report.push("quantity", "must not be negative");
        }
        report.finish()
    }

    fn references(&self) -> Vec<Reference> {
        self.admin_id
            .iter()
            .map(|admin_id| Reference::new(BloodBankForeignKey::Admin, admin_id))
            .collect()
    }

    fn unique_fields(&self) -> Vec<UniqueField> {
        self.admin_id
            .iter()
            .map(|admin_id| UniqueField {
                column: BloodBankForeignKey::Admin.column(),
                value: admin_id.to_string(),
            })
            .collect()
    }
}
