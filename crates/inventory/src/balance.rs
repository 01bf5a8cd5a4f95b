//! Balance derivation and the pre-flight decrease guard.
//!
//! The authoritative balance comes from the store's per-item view; these
//! functions compute the same figure from a movement list (used by the
//! in-memory store and by tests) and decide whether a decrease may proceed.

use std::collections::HashMap;

use materials_core::{DomainError, DomainResult, ItemId};

use crate::{Movement, Quantity};

/// Sum of increases minus decreases for one item.
///
/// Movements with unrecognized labels do not contribute.
pub fn balance_of<'a>(movements: impl IntoIterator<Item = &'a Movement>, item_id: ItemId) -> i64 {
    movements
        .into_iter()
        .filter(|m| m.item_id == item_id)
        .filter_map(Movement::signed_qty)
        .sum()
}

/// Balances for every item that appears in the movement list.
pub fn balances<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> HashMap<ItemId, i64> {
    let mut out = HashMap::new();
    for m in movements {
        if let Some(delta) = m.signed_qty() {
            *out.entry(m.item_id).or_insert(0) += delta;
        }
    }
    out
}

/// Decide whether a decrease may be submitted.
///
/// Unknown balance (view unavailable) never blocks; a known balance blocks
/// any request that exceeds it. Advisory only: concurrent decreases can
/// still race past this check.
pub fn check_decrease(known_balance: Option<i64>, requested: Quantity) -> DomainResult<()> {
    match known_balance {
        Some(available) if requested.get() > available => {
            tracing::warn!(available, requested = requested.get(), "decrease exceeds balance");
            Err(DomainError::insufficient_balance(available, requested.get()))
        }
        _ => Ok(()),
    }
}
