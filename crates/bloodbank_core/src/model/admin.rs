//! Admin entity.
//!
//! An admin may manage one blood bank. The link is stored on the blood bank
//! (`BloodBank::admin_id`); the managed bank is looked up, not held here.

use super::ids::AdminId;
use super::validation::{ContactFormat, ValidationReport};
use super::{Entity, EntityKind, NoForeignKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub location: Option<String>,
    pub contact_number: Option<String>,
}

impl Admin {
    pub fn new(id: AdminId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            contact_number: None,
        }
    }
}

impl Entity for Admin {
    const KIND: EntityKind = EntityKind::Admin;
    type Id = AdminId;
    type ForeignKey = NoForeignKey;

    fn id(&self) -> &AdminId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("name", &self.name, 2, 50);
        report.optional_text("location", self.location.as_deref(), 100);
        if let Some(contact) = self.contact_number.as_deref() {
            report.contact("contact_number", contact, ContactFormat::TenDigits);
        }
        report.finish()
    }
}
