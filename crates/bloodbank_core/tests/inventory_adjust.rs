use bloodbank_core::db::{open_db, open_db_in_memory};
use bloodbank_core::model::{BloodBank, BloodBankId, EntityId};
use bloodbank_core::{BloodBankSystem, DomainError, QuantityAdjustment, QuantityLocks};
use proptest::prelude::*;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

fn bb(raw: &str) -> BloodBankId {
    BloodBankId::parse(raw).unwrap()
}

fn create_bank(system: &BloodBankSystem<'_>, raw: &str, quantity: i64) {
    let mut bank = BloodBank::new(bb(raw), "Central", "Downtown");
    bank.quantity = quantity;
    system.blood_banks().create(&bank).unwrap();
}

#[test]
fn adjust_example_sequence() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    create_bank(&system, "BB1", 10);
    let id = bb("BB1");

    match system.adjust_quantity(&id, -15) {
        Err(DomainError::InsufficientStock {
            blood_bank_id,
            available,
            requested,
        }) => {
            assert_eq!(blood_bank_id, "BB1");
            assert_eq!(available, 10);
            assert_eq!(requested, 15);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(system.inventory().quantity_of(&id).unwrap(), 10);

    assert_eq!(
        system.adjust_quantity(&id, -10).unwrap(),
        QuantityAdjustment {
            previous: 10,
            delta: -10,
            current: 0,
        }
    );

    assert!(matches!(
        system.adjust_quantity(&id, -1),
        Err(DomainError::InsufficientStock { available: 0, .. })
    ));
    assert_eq!(system.inventory().quantity_of(&id).unwrap(), 0);
}

#[test]
fn adjust_of_unknown_bank_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    assert!(matches!(
        system.adjust_quantity(&bb("BB9"), 5),
        Err(DomainError::NotFound { .. })
    ));
}

#[test]
fn zero_delta_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    create_bank(&system, "BB1", 3);

    let adjustment = system.adjust_quantity(&bb("BB1"), 0).unwrap();
    assert_eq!(adjustment.previous, 3);
    assert_eq!(adjustment.current, 3);
}

#[test]
fn overflow_is_rejected_and_quantity_kept() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    create_bank(&system, "BB1", i64::MAX - 1);

    assert!(matches!(
        system.adjust_quantity(&bb("BB1"), 2),
        Err(DomainError::QuantityOverflow { .. })
    ));
    assert_eq!(
        system.inventory().quantity_of(&bb("BB1")).unwrap(),
        i64::MAX - 1
    );
}

#[test]
fn negative_initial_quantity_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();

    let mut bank = BloodBank::new(bb("BB1"), "Central", "Downtown");
    bank.quantity = -1;
    match system.blood_banks().create(&bank) {
        Err(DomainError::Validation { report, .. }) => assert!(report.has("quantity")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn adjustments_of_different_banks_are_independent() {
    let conn = open_db_in_memory().unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    create_bank(&system, "BB1", 5);
    create_bank(&system, "BB2", 0);

    system.adjust_quantity(&bb("BB1"), -5).unwrap();
    assert!(system.adjust_quantity(&bb("BB2"), -1).is_err());
    system.adjust_quantity(&bb("BB2"), 7).unwrap();

    assert_eq!(system.inventory().quantity_of(&bb("BB1")).unwrap(), 0);
    assert_eq!(system.inventory().quantity_of(&bb("BB2")).unwrap(), 7);
}

proptest! {
    #[test]
    fn final_quantity_matches_prefix_sums(
        initial in 0_i64..50,
        deltas in proptest::collection::vec(-30_i64..30, 0..25),
    ) {
        let conn = open_db_in_memory().unwrap();
        let system = BloodBankSystem::try_new(&conn).unwrap();
        create_bank(&system, "BB1", initial);
        let id = bb("BB1");

        let mut expected = initial;
        for delta in deltas {
            let result = system.adjust_quantity(&id, delta);
            if expected + delta >= 0 {
                expected += delta;
                prop_assert_eq!(result.unwrap().current, expected);
            } else {
                let rejected = matches!(result, Err(DomainError::InsufficientStock { .. }));
                prop_assert!(rejected);
            }
            prop_assert_eq!(system.inventory().quantity_of(&id).unwrap(), expected);
        }
    }
}

fn run_concurrent_adjustments(path: &Path, workers: usize, per_worker: usize, delta: i64) -> usize {
    let locks = Arc::new(QuantityLocks::new());
    let barrier = Arc::new(Barrier::new(workers));

    let handles = (0..workers)
        .map(|_| {
            let path = path.to_path_buf();
            let locks = Arc::clone(&locks);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let system = BloodBankSystem::with_locks(&conn, locks).unwrap();
                barrier.wait();
                let mut accepted = 0;
                for _ in 0..per_worker {
                    match system.adjust_quantity(&bb("BB1"), delta) {
                        Ok(_) => accepted += 1,
                        Err(DomainError::InsufficientStock { .. }) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                accepted
            })
        })
        .collect::<Vec<_>>();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum()
}

#[test]
fn concurrent_increments_lose_no_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    {
        let conn = open_db(&path).unwrap();
        let system = BloodBankSystem::try_new(&conn).unwrap();
        create_bank(&system, "BB1", 0);
    }

    let accepted = run_concurrent_adjustments(&path, 8, 25, 1);
    assert_eq!(accepted, 200);

    let conn = open_db(&path).unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    assert_eq!(system.inventory().quantity_of(&bb("BB1")).unwrap(), 200);
}

#[test]
fn concurrent_withdrawals_never_overdraw() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    {
        let conn = open_db(&path).unwrap();
        let system = BloodBankSystem::try_new(&conn).unwrap();
        create_bank(&system, "BB1", 50);
    }

    let accepted = run_concurrent_adjustments(&path, 6, 20, -1);
    assert_eq!(accepted, 50);

    let conn = open_db(&path).unwrap();
    let system = BloodBankSystem::try_new(&conn).unwrap();
    assert_eq!(system.inventory().quantity_of(&bb("BB1")).unwrap(), 0);
}
