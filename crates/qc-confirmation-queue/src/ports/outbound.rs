//! Outbound Ports (Driven Ports / SPI)
//!
//! The queue and the head pointer live in a shared, out-of-process key-value
//! store that only offers whole-value reads and writes. Atomicity is layered
//! on top through `compare_and_set`; see `ConfirmationQueue`.

use crate::domain::errors::{AdvanceError, ScheduleError, StoreError};
use crate::domain::value_objects::{AdvanceReport, BlockIdentifier, HeadAdvancementRequest};
use async_trait::async_trait;

/// Outcome of a compare-and-set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// The value matched `expected` and was replaced.
    Swapped,
    /// Another writer got there first; carries what is stored now.
    Conflict { current: Option<Vec<u8>> },
}

/// Shared key-value store holding the queue and the head pointer.
///
/// Values never expire.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Reads the whole value under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrites `key` unconditionally.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Replaces the value under `key` only if it still equals `expected`
    /// (`None` meaning absent). A `None` replacement deletes the key.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        replacement: Option<Vec<u8>>,
    ) -> Result<CasOutcome, StoreError>;
}

/// Hands head advancement requests to an independent worker.
///
/// Fire and forget: `Ok` only means the request was queued.
pub trait HeadAdvancementScheduler: Send + Sync {
    fn schedule(&self, request: HeadAdvancementRequest) -> Result<(), ScheduleError>;
}

/// Walks the queue from the current head and commits contiguous blocks.
///
/// Implemented by the ledger side; this crate only drives it.
#[async_trait]
pub trait HeadAdvancer: Send + Sync {
    async fn advance(&self, head_block_hash: &BlockIdentifier)
        -> Result<AdvanceReport, AdvanceError>;
}
