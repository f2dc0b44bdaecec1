//! Row mappings between entities and their SQLite tables.
//!
//! # Invariants
//! - `COLUMNS[0]` is always `id`; `to_values` yields values in `COLUMNS` order.
//! - Decoding re-validates identifiers and rejects corrupt rows with
//!   `RepoError::InvalidData` instead of masking them.

use super::{RepoError, RepoResult};
use crate::model::blood_bank::BLOOD_GROUP_SEPARATOR;
use crate::model::{
    normalize_blood_groups, Admin, Blood, BloodBank, Donor, EmployeeTeam, Entity, EntityId,
    Hospital, Patient,
};
use rusqlite::types::Value;
use rusqlite::Row;

/// Entity kinds that know how to map themselves onto one SQLite table.
pub trait SqliteRecord: Entity {
    const COLUMNS: &'static [&'static str];

    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

fn id_column<T: EntityId>(row: &Row<'_>, column: &'static str) -> RepoResult<T> {
    let raw: String = row.get(column)?;
    T::parse(&raw).map_err(|err| RepoError::InvalidData(format!("{err} in column `{column}`")))
}

fn optional_id_column<T: EntityId>(row: &Row<'_>, column: &'static str) -> RepoResult<Option<T>> {
    row.get::<_, Option<String>>(column)?
        .map(|raw| {
            T::parse(&raw)
                .map_err(|err| RepoError::InvalidData(format!("{err} in column `{column}`")))
        })
        .transpose()
}

impl SqliteRecord for Admin {
    const COLUMNS: &'static [&'static str] = &["id", "name", "location", "contact_number"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            optional_text(self.location.as_deref()),
            optional_text(self.contact_number.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            location: row.get("location")?,
            contact_number: row.get("contact_number")?,
        })
    }
}

impl SqliteRecord for BloodBank {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "location",
        "available_blood_groups",
        "quantity",
        "admin_id",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            text(&self.location),
            Value::Text(self.joined_blood_groups()),
            Value::Integer(self.quantity),
            optional_text(self.admin_id.as_ref().map(EntityId::as_str)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let quantity: i64 = row.get("quantity")?;
        if quantity < 0 {
            return Err(RepoError::InvalidData(format!(
                "negative quantity `{quantity}` in blood_banks.quantity"
            )));
        }
        let groups: String = row.get("available_blood_groups")?;
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            location: row.get("location")?,
            available_blood_groups: normalize_blood_groups(groups.split(BLOOD_GROUP_SEPARATOR)),
            quantity,
            admin_id: optional_id_column(row, "admin_id")?,
        })
    }
}

impl SqliteRecord for Blood {
    const COLUMNS: &'static [&'static str] =
        &["id", "blood_group", "stored_in", "donated_by", "received_by"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.blood_group),
            text(self.stored_in.as_str()),
            optional_text(self.donated_by.as_ref().map(EntityId::as_str)),
            optional_text(self.received_by.as_ref().map(EntityId::as_str)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            blood_group: row.get("blood_group")?,
            stored_in: id_column(row, "stored_in")?,
            donated_by: optional_id_column(row, "donated_by")?,
            received_by: optional_id_column(row, "received_by")?,
        })
    }
}

impl SqliteRecord for Donor {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "gender",
        "address",
        "contact_number",
        "age",
        "blood_group",
        "donation_date",
        "registered_by",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            optional_text(self.gender.as_deref()),
            optional_text(self.address.as_deref()),
            text(&self.contact_number),
            Value::Integer(self.age),
            text(&self.blood_group),
            optional_integer(self.donation_date),
            text(self.registered_by.as_str()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            gender: row.get("gender")?,
            address: row.get("address")?,
            contact_number: row.get("contact_number")?,
            age: row.get("age")?,
            blood_group: row.get("blood_group")?,
            donation_date: row.get("donation_date")?,
            registered_by: id_column(row, "registered_by")?,
        })
    }
}

impl SqliteRecord for Patient {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "gender",
        "address",
        "contact_number",
        "blood_group",
        "intake_date",
        "registered_by",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            optional_text(self.gender.as_deref()),
            optional_text(self.address.as_deref()),
            text(&self.contact_number),
            text(&self.blood_group),
            optional_integer(self.intake_date),
            text(self.registered_by.as_str()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            gender: row.get("gender")?,
            address: row.get("address")?,
            contact_number: row.get("contact_number")?,
            blood_group: row.get("blood_group")?,
            intake_date: row.get("intake_date")?,
            registered_by: id_column(row, "registered_by")?,
        })
    }
}

impl SqliteRecord for EmployeeTeam {
    const COLUMNS: &'static [&'static str] = &["id", "name", "contact_number"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            text(&self.contact_number),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            contact_number: row.get("contact_number")?,
        })
    }
}

impl SqliteRecord for Hospital {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "location", "contacted_blood_bank"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(self.id.as_str()),
            text(&self.name),
            text(&self.location),
            text(self.contacted_blood_bank.as_str()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: id_column(row, "id")?,
            name: row.get("name")?,
            location: row.get("location")?,
            contacted_blood_bank: id_column(row, "contacted_blood_bank")?,
        })
    }
}
