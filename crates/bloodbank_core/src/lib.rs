//! Core domain logic for the blood bank inventory engine.
//! This crate is the single source of truth for referential and stock
//! invariants.

pub mod config;
pub mod db;
pub mod error;
pub mod integrity;
pub mod inventory;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError};
pub use error::{DomainError, DomainResult};
pub use integrity::CascadeReport;
pub use inventory::{InventoryController, QuantityAdjustment, QuantityLocks};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::{
    Admin, AdminId, Blood, BloodBank, BloodBankId, BloodId, Donor, DonorId, EmployeeTeam,
    EmployeeTeamId, Entity, EntityId, EntityKind, Hospital, HospitalId, Patient, PatientId,
    ValidationReport,
};
pub use repo::{RepoError, RepoResult, Repository, SqliteRepository};
pub use service::{BloodBankSystem, CrudService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
