//! Domain invariants for confirmation blocks and the queue.
//!
//! | Invariant | Checked by |
//! |-----------|-----------|
//! | Account numbers distinct within a block | `validator::check_balance_set` |
//! | Exactly one balance lock per block | `validator::check_balance_set` |
//! | Block identifiers unique across the queue | `validator::check_unique`, `ConfirmationQueue::enqueue` |

use super::entities::{ConfirmationBlock, UpdatedBalance};
use super::value_objects::{AccountNumber, BlockIdentifier};
use std::collections::HashSet;

/// First account number that appears twice, if any.
pub fn first_duplicate_account(balances: &[UpdatedBalance]) -> Option<&AccountNumber> {
    let mut seen = HashSet::with_capacity(balances.len());
    balances
        .iter()
        .map(|b| &b.account_number)
        .find(|account| !seen.insert(*account))
}

/// Number of entries carrying a balance lock.
pub fn balance_lock_count(balances: &[UpdatedBalance]) -> usize {
    balances.iter().filter(|b| b.balance_lock.is_some()).count()
}

/// Whether `identifier` is already resident.
pub fn is_resident(identifier: &BlockIdentifier, resident: &[ConfirmationBlock]) -> bool {
    resident.iter().any(|b| &b.block_identifier == identifier)
}

/// Whether every resident block has a distinct identifier.
pub fn identifiers_unique(resident: &[ConfirmationBlock]) -> bool {
    let mut seen = HashSet::with_capacity(resident.len());
    resident.iter().all(|b| seen.insert(&b.block_identifier))
}
