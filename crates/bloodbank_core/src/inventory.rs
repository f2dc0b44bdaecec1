//! Blood bank quantity controller.
//!
//! # Responsibility
//! - Apply signed deltas to a blood bank's on-hand counter.
//! - Serialize every read-modify-write of one bank's counter.
//!
//! # Invariants
//! - The stored quantity is never negative; a rejected adjustment leaves it
//!   untouched.
//! - Callers sharing one `QuantityLocks` never interleave adjustments of the
//!   same bank. Different banks use different slots.
//! - Each adjustment runs in its own immediate transaction, so connections
//!   that do not share the lock table are still serialized by SQLite.

use crate::db::immediate_transaction;
use crate::error::{DomainError, DomainResult};
use crate::model::{BloodBank, BloodBankId, EntityKind};
use crate::repo::{Repository, SqliteRepository};
use log::{info, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Slot count above which idle slots are dropped on the next lookup.
const PRUNE_THRESHOLD: usize = 64;

/// Keyed lock table guarding blood bank quantity counters.
#[derive(Debug, Default)]
pub struct QuantityLocks {
    slots: Mutex<HashMap<BloodBankId, Arc<Mutex<()>>>>,
}

impl QuantityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `body` while holding the slot for `blood_bank_id`.
    ///
    /// A poisoned slot is recovered; the guarded data is `()` and the store
    /// itself is protected by the transaction, not by the mutex.
    pub fn with_lock<T>(&self, blood_bank_id: &BloodBankId, body: impl FnOnce() -> T) -> T {
        let slot = self.slot(blood_bank_id);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        body()
    }

    /// Number of slots currently allocated.
    pub fn slot_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, blood_bank_id: &BloodBankId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.len() >= PRUNE_THRESHOLD {
            // Only the table itself holds an idle slot.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        Arc::clone(slots.entry(blood_bank_id.clone()).or_default())
    }
}

/// Outcome of one accepted adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityAdjustment {
    pub previous: i64,
    pub delta: i64,
    pub current: i64,
}

/// Applies quantity adjustments on one connection.
pub struct InventoryController<'a> {
    conn: &'a Connection,
    locks: &'a QuantityLocks,
}

impl<'a> InventoryController<'a> {
    pub fn new(conn: &'a Connection, locks: &'a QuantityLocks) -> Self {
        Self { conn, locks }
    }

    /// Adds `delta` to the bank's quantity.
    ///
    /// # Errors
    /// - `NotFound` when the bank does not exist.
    /// - `InsufficientStock` when the result would be negative.
    /// - `QuantityOverflow` when the result does not fit in `i64`.
    pub fn adjust_quantity(
        &self,
        blood_bank_id: &BloodBankId,
        delta: i64,
    ) -> DomainResult<QuantityAdjustment> {
        let started_at = Instant::now();
        let result = self.locks.with_lock(blood_bank_id, || {
            immediate_transaction(self.conn, |tx| apply_delta(tx, blood_bank_id, delta))
        });

        match &result {
            Ok(adjustment) => info!(
                "event=quantity_adjust module=inventory status=ok blood_bank_id={} delta={} previous={} current={} duration_ms={}",
                blood_bank_id,
                delta,
                adjustment.previous,
                adjustment.current,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=quantity_adjust module=inventory status=rejected blood_bank_id={} delta={} duration_ms={} error_code={}",
                blood_bank_id,
                delta,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }

    /// Reads the bank's current quantity.
    pub fn quantity_of(&self, blood_bank_id: &BloodBankId) -> DomainResult<i64> {
        SqliteRepository::<BloodBank>::new(self.conn)
            .get(blood_bank_id)?
            .map(|bank| bank.quantity)
            .ok_or_else(|| missing_bank(blood_bank_id))
    }
}

fn missing_bank(blood_bank_id: &BloodBankId) -> DomainError {
    DomainError::not_found(EntityKind::BloodBank, blood_bank_id.to_string())
}

fn apply_delta(
    conn: &Connection,
    blood_bank_id: &BloodBankId,
    delta: i64,
) -> DomainResult<QuantityAdjustment> {
    let banks = SqliteRepository::<BloodBank>::new(conn);
    let mut bank = banks
        .get(blood_bank_id)?
        .ok_or_else(|| missing_bank(blood_bank_id))?;

    let previous = bank.quantity;
    let current = previous
        .checked_add(delta)
        .ok_or_else(|| DomainError::QuantityOverflow {
            blood_bank_id: blood_bank_id.to_string(),
            current: previous,
            delta,
        })?;
    if current < 0 {
        return Err(DomainError::InsufficientStock {
            blood_bank_id: blood_bank_id.to_string(),
            available: previous,
            requested: delta.saturating_neg(),
        });
    }

    bank.quantity = current;
    banks.put(&bank)?;
    Ok(QuantityAdjustment {
        previous,
        delta,
        current,
    })
}
