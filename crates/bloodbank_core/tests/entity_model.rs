use bloodbank_core::model::{
    normalize_blood_groups, Admin, AdminId, Blood, BloodBank, BloodBankId, BloodId, Donor,
    DonorId, EmployeeTeam, EmployeeTeamId, Entity, EntityId, EntityKind, Hospital, HospitalId,
    IdErrorReason, Patient, PatientId,
};

fn team_id() -> EmployeeTeamId {
    EmployeeTeamId::parse("E1").unwrap()
}

#[test]
fn valid_entities_pass_validation() {
    let admin = Admin::new(AdminId::parse("A1").unwrap(), "Dana");
    let bank = BloodBank::new(BloodBankId::parse("BB1").unwrap(), "Central", "Downtown");
    let team = EmployeeTeam::new(team_id(), "Intake", "5550001111");
    let donor = Donor::new(
        DonorId::parse("D1").unwrap(),
        "Sam",
        "5550002222",
        30,
        "O+",
        team_id(),
    );
    let patient = Patient::new(
        PatientId::parse("P1").unwrap(),
        "Lee",
        "555000333344",
        "A-",
        team_id(),
    );
    let unit = Blood::new(BloodId::parse("B1").unwrap(), "O+", bank.id.clone());
    let hospital = Hospital::new(
        HospitalId::parse("H1").unwrap(),
        "General",
        "Uptown",
        bank.id.clone(),
    );

    admin.validate().unwrap();
    bank.validate().unwrap();
    team.validate().unwrap();
    donor.validate().unwrap();
    patient.validate().unwrap();
    unit.validate().unwrap();
    hospital.validate().unwrap();
}

#[test]
fn donor_validation_reports_every_bad_field() {
    let mut donor = Donor::new(
        DonorId::parse("D1").unwrap(),
        "",
        "12345",
        17,
        "O+",
        team_id(),
    );
    donor.gender = Some("x".repeat(11));

    let report = donor.validate().unwrap_err();
    assert!(report.has("name"));
    assert!(report.has("contact_number"));
    assert!(report.has("age"));
    assert!(report.has("gender"));
    assert!(!report.has("blood_group"));
    assert_eq!(report.violations().len(), 4);
}

#[test]
fn donor_age_bounds_are_inclusive() {
    let mut donor = Donor::new(
        DonorId::parse("D1").unwrap(),
        "Sam",
        "5550002222",
        18,
        "O+",
        team_id(),
    );
    donor.validate().unwrap();
    donor.age = 100;
    donor.validate().unwrap();
    donor.age = 101;
    assert!(donor.validate().unwrap_err().has("age"));
}

#[test]
fn patient_contact_allows_up_to_fifteen_digits() {
    let mut patient = Patient::new(
        PatientId::parse("P1").unwrap(),
        "Lee",
        "123456789012345",
        "A-",
        team_id(),
    );
    patient.validate().unwrap();

    patient.contact_number = "1234567890123456".to_string();
    assert!(patient.validate().unwrap_err().has("contact_number"));
}

#[test]
fn admin_name_needs_two_characters() {
    let admin = Admin::new(AdminId::parse("A1").unwrap(), "D");
    assert!(admin.validate().unwrap_err().has("name"));
}

#[test]
fn blood_group_tags_are_normalized() {
    let groups = normalize_blood_groups([" o+ ", "A-", "", "O+"]);
    assert_eq!(
        groups.into_iter().collect::<Vec<_>>(),
        vec!["A-".to_string(), "O+".to_string()]
    );

    let mut bank = BloodBank::new(BloodBankId::parse("BB1").unwrap(), "Central", "Downtown");
    bank.available_blood_groups = normalize_blood_groups(["b+", "ab-"]);
    assert_eq!(bank.joined_blood_groups(), "AB-,B+");
}

#[test]
fn blood_references_list_only_present_links() {
    let bank_id = BloodBankId::parse("BB1").unwrap();
    let mut unit = Blood::new(BloodId::parse("B1").unwrap(), "O+", bank_id);
    let references = unit.references();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].field, "stored_in");
    assert_eq!(references[0].target, EntityKind::BloodBank);

    unit.donated_by = Some(DonorId::parse("D2").unwrap());
    let references = unit.references();
    assert_eq!(references.len(), 2);
    assert_eq!(references[1].field, "donated_by");
    assert_eq!(references[1].target, EntityKind::Donor);
    assert_eq!(references[1].id, "D2");
}

#[test]
fn ids_of_different_kinds_do_not_parse_as_each_other() {
    assert!(DonorId::parse("P1").is_err());
    assert_eq!(
        AdminId::parse("A-1").unwrap_err().reason,
        IdErrorReason::Pattern
    );
    assert_eq!(AdminId::parse("A1").unwrap().kind(), EntityKind::Admin);
}

#[test]
fn entities_serialize_with_plain_string_ids() {
    let mut bank = BloodBank::new(BloodBankId::parse("BB3").unwrap(), "Central", "Downtown");
    bank.admin_id = Some(AdminId::parse("A9").unwrap());
    bank.quantity = 12;

    let json = serde_json::to_value(&bank).unwrap();
    assert_eq!(json["id"], "BB3");
    assert_eq!(json["admin_id"], "A9");
    assert_eq!(json["quantity"], 12);

    let restored: BloodBank = serde_json::from_value(json).unwrap();
    assert_eq!(restored, bank);
}

#[test]
fn deserializing_malformed_id_fails() {
    let json = serde_json::json!({
        "id": "X1",
        "name": "General",
        "location": "Uptown",
        "contacted_blood_bank": "BB1"
    });
    assert!(serde_json::from_value::<Hospital>(json).is_err());
}
