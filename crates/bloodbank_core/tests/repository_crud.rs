use bloodbank_core::db::open_db_in_memory;
use bloodbank_core::model::{
    normalize_blood_groups, Admin, AdminId, Blood, BloodBank, BloodBankId, BloodForeignKey,
    BloodId, Donor, DonorId, EmployeeTeam, EmployeeTeamId, EntityId, EntityKind, Hospital,
    HospitalId, Patient, PatientId,
};
use bloodbank_core::{BloodBankSystem, DomainError, Repository, SqliteRepository};

fn bank_id(raw: &str) -> BloodBankId {
    BloodBankId::parse(raw).unwrap()
}

fn team_id(raw: &str) -> EmployeeTeamId {
    EmployeeTeamId::parse(raw).unwrap()
}

fn seed_bank(system: &BloodBankSystem<'_>, raw: &str) -> BloodBank {
    let mut bank = BloodBank::new(bank_id(raw), "Central", "Downtown");
    bank.available_blood_groups = normalize_blood_groups(["O+", "A-"]);
    system.blood_banks().create(&bank).unwrap();
    bank
}

#[test]
fn repository_put_inserts_then_replaces() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<EmployeeTeam>::try_new(&conn).unwrap();

    let mut team = EmployeeTeam::new(team_id("E1"), "Intake", "5550001111");
    repo.put(&team).unwrap();
    assert_eq!(repo.get(&team.id).unwrap(), Some(team.clone()));

    team.name = "Night intake".to_string();
    repo.put(&team).unwrap();
    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Night intake");
}

#[test]
fn repository_delete_of_absent_key_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Admin>::try_new(&conn).unwrap();

    assert!(!repo.delete(&AdminId::parse("A7").unwrap()).unwrap());
    assert!(repo.get(&AdminId::parse("A7").unwrap()).unwrap().is_none());
}

#[test]
fn list_all_orders_by_numeric_suffix() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Admin>::try_new(&conn).unwrap();
    for raw in ["A10", "A2", "A1"] {
        repo.put(&Admin::new(AdminId::parse(raw).unwrap(), "Dana"))
            .unwrap();
    }

    let ids = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|admin| admin.id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["A1", "A2", "A10"]);
}

#[test]
fn corrupt_row_surfaces_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO admins (id, name) VALUES ('not-an-id', 'Dana');",
        [],
    )
    .unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    assert!(matches!(
        system.admins().list_all(),
        Err(DomainError::InvalidData(_))
    ));
}

#[test]
fn create_get_update_through_facade() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    let bank = seed_bank(&system, "BB1");

    let loaded = system.blood_banks().get_by_id(&bank.id).unwrap();
    assert_eq!(loaded, bank);

    let mut renamed = loaded.clone();
    renamed.name = "Central North".to_string();
    system.blood_banks().update(&renamed).unwrap();
    assert_eq!(
        system.blood_banks().get_by_id(&bank.id).unwrap().name,
        "Central North"
    );
}

#[test]
fn create_with_taken_id_is_duplicate_key() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    seed_bank(&system, "BB1");

    let again = BloodBank::new(bank_id("BB1"), "Other", "Elsewhere");
    match system.blood_banks().create(&again) {
        Err(DomainError::DuplicateKey {
            kind,
            field,
            existing_id,
            ..
        }) => {
            assert_eq!(kind, EntityKind::BloodBank);
            assert_eq!(field, "id");
            assert_eq!(existing_id, "BB1");
        }
        other => panic!("expected duplicate key, got {other:?}"),
    }
    assert_eq!(
        system.blood_banks().get_by_id(&bank_id("BB1")).unwrap().name,
        "Central"
    );
}

#[test]
fn update_and_get_of_missing_entity_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    let ghost = Admin::new(AdminId::parse("A3").unwrap(), "Ghost");
    assert!(matches!(
        system.admins().update(&ghost),
        Err(DomainError::NotFound {
            kind: EntityKind::Admin,
            ..
        })
    ));
    assert!(matches!(
        system.admins().get_by_id(&ghost.id),
        Err(DomainError::NotFound { .. })
    ));
    assert!(system.admins().list_all().unwrap().is_empty());
}

#[test]
fn get_by_raw_id_rejects_malformed_identifier() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    assert!(matches!(
        system.hospitals().get_by_raw_id("BB1"),
        Err(DomainError::InvalidId(_))
    ));
}

#[test]
fn invalid_fields_are_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    let team = EmployeeTeam::new(team_id("E1"), "", "123");
    match system.employee_teams().create(&team) {
        Err(DomainError::Validation { kind, report }) => {
            assert_eq!(kind, EntityKind::EmployeeTeam);
            assert!(report.has("name"));
            assert!(report.has("contact_number"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(system.employee_teams().list_all().unwrap().is_empty());
}

#[test]
fn update_never_moves_blood_bank_quantity() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    let bank = seed_bank(&system, "BB1");
    system.adjust_quantity(&bank.id, 10).unwrap();

    let mut edited = system.blood_banks().get_by_id(&bank.id).unwrap();
    edited.quantity = 999;
    edited.location = "Harbor".to_string();
    system.blood_banks().update(&edited).unwrap();

    let stored = system.blood_banks().get_by_id(&bank.id).unwrap();
    assert_eq!(stored.quantity, 10);
    assert_eq!(stored.location, "Harbor");
}

#[test]
fn next_id_follows_largest_suffix() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    assert_eq!(system.admins().next_id().unwrap().as_str(), "A1");
    assert_eq!(system.blood_banks().next_id().unwrap().as_str(), "BB1");

    seed_bank(&system, "BB2");
    seed_bank(&system, "BB10");
    assert_eq!(system.blood_banks().next_id().unwrap().as_str(), "BB11");
}

#[test]
fn reverse_lookups_follow_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    let first = seed_bank(&system, "BB1");
    let second = seed_bank(&system, "BB2");

    let team = EmployeeTeam::new(team_id("E1"), "Intake", "5550001111");
    system.employee_teams().create(&team).unwrap();
    let donor = Donor::new(
        DonorId::parse("D1").unwrap(),
        "Sam",
        "5550002222",
        30,
        "O+",
        team.id.clone(),
    );
    system.donors().create(&donor).unwrap();
    let patient = Patient::new(
        PatientId::parse("P1").unwrap(),
        "Lee",
        "5550003333",
        "O+",
        team.id.clone(),
    );
    system.patients().create(&patient).unwrap();

    let mut donated = Blood::new(BloodId::parse("B1").unwrap(), "O+", first.id.clone());
    donated.donated_by = Some(donor.id.clone());
    system.blood_units().create(&donated).unwrap();
    let mut received = Blood::new(BloodId::parse("B2").unwrap(), "O+", second.id.clone());
    received.received_by = Some(patient.id.clone());
    system.blood_units().create(&received).unwrap();

    system
        .hospitals()
        .create(&Hospital::new(
            HospitalId::parse("H1").unwrap(),
            "General",
            "Uptown",
            second.id.clone(),
        ))
        .unwrap();

    let units = system.blood_units();
    assert_eq!(units.list_by_blood_bank(&first.id).unwrap(), vec![donated.clone()]);
    assert_eq!(units.list_by_donor(&donor.id).unwrap(), vec![donated]);
    assert_eq!(units.list_by_patient(&patient.id).unwrap(), vec![received]);
    assert!(system
        .hospitals()
        .list_by_blood_bank(&first.id)
        .unwrap()
        .is_empty());
    assert_eq!(
        system.hospitals().list_by_blood_bank(&second.id).unwrap().len(),
        1
    );
    assert_eq!(
        system.donors().list_by_employee_team(&team.id).unwrap(),
        vec![donor]
    );
    assert_eq!(
        system.patients().list_by_employee_team(&team.id).unwrap(),
        vec![patient]
    );

    let repo = SqliteRepository::<Blood>::try_new(&conn).unwrap();
    assert_eq!(
        repo.list_by_foreign_key(BloodForeignKey::StoredIn, "BB2")
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn find_by_admin_returns_managed_bank() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    let admin = Admin::new(AdminId::parse("A1").unwrap(), "Dana");
    system.admins().create(&admin).unwrap();
    assert!(system.blood_banks().find_by_admin(&admin.id).unwrap().is_none());

    let mut bank = BloodBank::new(bank_id("BB1"), "Central", "Downtown");
    bank.admin_id = Some(admin.id.clone());
    system.blood_banks().create(&bank).unwrap();

    assert_eq!(
        system.blood_banks().find_by_admin(&admin.id).unwrap(),
        Some(bank)
    );
}

#[test]
fn entity_counts_cover_every_kind() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    seed_bank(&system, "BB1");

    let counts = system.entity_counts().unwrap();
    assert_eq!(counts.len(), EntityKind::ALL.len());
    assert!(counts.contains(&(EntityKind::BloodBank, 1)));
    assert!(counts.contains(&(EntityKind::Donor, 0)));
}

#[test]
fn blood_groups_read_back_exactly_as_written() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    let mut raw = BloodBank::new(bank_id("BB1"), "Central", "Downtown");
    raw.available_blood_groups = [" o- ", "A+", "a+"].into_iter().map(String::from).collect();
    match system.blood_banks().create(&raw) {
        Err(DomainError::Validation { report, .. }) => {
            assert!(report.has("available_blood_groups"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(system.blood_banks().list_all().unwrap().is_empty());

    let mut bank = raw.clone();
    bank.available_blood_groups = normalize_blood_groups(&raw.available_blood_groups);
    system.blood_banks().create(&bank).unwrap();
    let stored = system.blood_banks().get_by_id(&bank.id).unwrap();
    assert_eq!(stored, bank);
    assert_eq!(stored.joined_blood_groups(), "A+,O-");
}
