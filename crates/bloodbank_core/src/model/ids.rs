//! Typed entity identifiers.
//!
//! # Responsibility
//! - Give every entity kind its own identifier type so ids of different
//!   kinds cannot be mixed up at compile time.
//! - Validate the kind-specific `<PREFIX><digits>` pattern and length limit.
//!
//! # Invariants
//! - A constructed id always matches its pattern and is at most
//!   `MAX_ID_LEN` characters long.
//! - Serialization is the plain string form; deserialization re-validates.

use super::EntityKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

/// Maximum identifier length for every kind.
pub const MAX_ID_LEN: usize = 20;

/// Why an identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdErrorReason {
    Blank,
    TooLong,
    Pattern,
}

/// Identifier failed kind-specific format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdError {
    pub kind: EntityKind,
    pub value: String,
    pub reason: IdErrorReason,
}

impl Display for IdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            IdErrorReason::Blank => write!(f, "{} id must not be blank", self.kind),
            IdErrorReason::TooLong => write!(
                f,
                "{} id `{}` exceeds {MAX_ID_LEN} characters",
                self.kind, self.value
            ),
            IdErrorReason::Pattern => write!(
                f,
                "{} id `{}` must be `{}` followed by digits",
                self.kind,
                self.value,
                self.kind.id_prefix()
            ),
        }
    }
}

impl Error for IdError {}

/// Shared behavior of the typed identifiers.
pub trait EntityId:
    Clone + Eq + Ord + Hash + Debug + Display + FromStr<Err = IdError>
{
    const KIND: EntityKind;

    /// Parses and validates an identifier.
    fn parse(value: &str) -> Result<Self, IdError>;

    fn as_str(&self) -> &str;

    fn kind(&self) -> EntityKind {
        Self::KIND
    }

    /// Numeric part after the prefix, when it fits in `u64`.
    fn sequence(&self) -> Option<u64> {
        self.as_str()[Self::KIND.id_prefix().len()..].parse().ok()
    }

    /// Builds the identifier `<PREFIX><sequence>`.
    fn from_sequence(sequence: u64) -> Result<Self, IdError> {
        Self::parse(&format!("{}{sequence}", Self::KIND.id_prefix()))
    }
}

fn check_id(kind: EntityKind, value: &str) -> Result<(), IdError> {
    let reject = |reason| IdError {
        kind,
        value: value.to_string(),
        reason,
    };

    if value.trim().is_empty() {
        return Err(reject(IdErrorReason::Blank));
    }
    if value.chars().count() > MAX_ID_LEN {
        return Err(reject(IdErrorReason::TooLong));
    }
    let digits = value
        .strip_prefix(kind.id_prefix())
        .ok_or_else(|| reject(IdErrorReason::Pattern))?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(reject(IdErrorReason::Pattern));
    }
    Ok(())
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            fn parse(value: &str) -> Result<Self, IdError> {
                let value = value.trim();
                check_id(Self::KIND, value)?;
                Ok(Self(value.to_string()))
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <Self as EntityId>::parse(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                <Self as EntityId>::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Admin identifier, `A` followed by digits.
    AdminId => EntityKind::Admin
);
entity_id!(
    /// Blood bank identifier, `BB` followed by digits.
    BloodBankId => EntityKind::BloodBank
);
entity_id!(
    /// Blood unit identifier, `B` followed by digits.
    BloodId => EntityKind::Blood
);
entity_id!(
    /// Donor identifier, `D` followed by digits.
    DonorId => EntityKind::Donor
);
entity_id!(
    /// Patient identifier, `P` followed by digits.
    PatientId => EntityKind::Patient
);
entity_id!(
    /// Employee team identifier, `E` followed by digits.
    EmployeeTeamId => EntityKind::EmployeeTeam
);
entity_id!(
    /// Hospital identifier, `H` followed by digits.
    HospitalId => EntityKind::Hospital
);

#[cfg(test)]
mod tests {
    use super::{BloodBankId, BloodId, EntityId, IdErrorReason, HospitalId};

    #[test]
    fn accepts_prefix_followed_by_digits() {
        let id = BloodBankId::parse(" BB12 ").unwrap();
        assert_eq!(id.as_str(), "BB12");
        assert_eq!(id.sequence(), Some(12));
    }

    #[test]
    fn blood_and_blood_bank_prefixes_do_not_overlap() {
        assert_eq!(
            BloodId::parse("BB1").unwrap_err().reason,
            IdErrorReason::Pattern
        );
        assert_eq!(
            BloodBankId::parse("B1").unwrap_err().reason,
            IdErrorReason::Pattern
        );
    }

    #[test]
    fn rejects_blank_long_and_malformed_values() {
        assert_eq!(
            HospitalId::parse("  ").unwrap_err().reason,
            IdErrorReason::Blank
        );
        assert_eq!(
            HospitalId::parse("H123456789012345678901").unwrap_err().reason,
            IdErrorReason::TooLong
        );
        assert_eq!(
            HospitalId::parse("H").unwrap_err().reason,
            IdErrorReason::Pattern
        );
        assert_eq!(
            HospitalId::parse("H1a").unwrap_err().reason,
            IdErrorReason::Pattern
        );
    }

    #[test]
    fn from_sequence_builds_prefixed_id() {
        assert_eq!(BloodBankId::from_sequence(7).unwrap().as_str(), "BB7");
    }
}
