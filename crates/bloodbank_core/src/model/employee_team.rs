//! Employee team entity: registers donors and patients.

use super::ids::EmployeeTeamId;
use super::validation::{ContactFormat, ValidationReport};
use super::{Entity, EntityKind, NoForeignKey, UniqueField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTeam {
    pub id: EmployeeTeamId,
    pub name: String,
    /// Unique across employee teams.
    pub contact_number: String,
}

impl EmployeeTeam {
    pub fn new(
        id: EmployeeTeamId,
        name: impl Into<String>,
        contact_number: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            contact_number: contact_number.into(),
        }
    }
}

impl Entity for EmployeeTeam {
    const KIND: EntityKind = EntityKind::EmployeeTeam;
    type Id = EmployeeTeamId;
    type ForeignKey = NoForeignKey;

    fn id(&self) -> &EmployeeTeamId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        report.text("name", &self.name, 1, 100);
        report.contact(
            "contact_number",
            &self.contact_number,
            ContactFormat::TenDigits,
        );
        report.finish()
    }

    fn unique_fields(&self) -> Vec<UniqueField> {
        vec![UniqueField {
            column: "contact_number",
            value: self.contact_number.clone(),
        }]
    }
}
