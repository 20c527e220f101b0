//! # Confirmation Queue
//!
//! The queue is one JSON array stored under a single key. The store only
//! supports whole-value get/set, so every mutation is a read-modify-write of
//! the entire array.
//!
//! ## Lost-update hazard
//!
//! Two submitters that both read `[A]`, append their own block and write back
//! leave either `[A, B]` or `[A, C]`; one block silently disappears. Every
//! mutation here therefore runs as an optimistic compare-and-set loop keyed
//! on the queue key:
//!
//! ```text
//! read bytes ──→ decode ──→ mutate ──→ CAS(expected = bytes read)
//!     ↑                                     │
//!     └──── backoff ←── Conflict{current} ──┘
//! ```
//!
//! After `max_attempts` lost races the operation fails with
//! `QueueError::Transient`.

use crate::config::QueueConfig;
use crate::domain::entities::{ConfirmationBlock, ValidatedBlock};
use crate::domain::errors::QueueError;
use crate::domain::invariants::{identifiers_unique, is_resident};
use crate::domain::value_objects::BlockIdentifier;
use crate::ports::outbound::{CasOutcome, SharedStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded exponential backoff between compare-and-set attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay after the `attempt`-th lost race (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl From<&QueueConfig> for RetryPolicy {
    fn from(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_enqueue_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&QueueConfig::default())
    }
}

/// Result of `enqueue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended; carries the queue depth afterwards.
    Enqueued { depth: usize },
    /// A block with the same identifier is already resident; nothing written.
    AlreadyQueued,
}

/// What a mutation decided to do with the decoded queue.
enum Mutation<R> {
    Write(R),
    Keep(R),
}

/// Shared queue of pending confirmation blocks.
#[derive(Clone)]
pub struct ConfirmationQueue {
    store: Arc<dyn SharedStore>,
    key: String,
    retry: RetryPolicy,
}

impl ConfirmationQueue {
    /// A policy with `max_attempts == 0` is treated as a single attempt.
    pub fn new(store: Arc<dyn SharedStore>, key: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            store,
            key: key.into(),
            retry: RetryPolicy {
                max_attempts: retry.max_attempts.max(1),
                ..retry
            },
        }
    }

    pub fn from_config(store: Arc<dyn SharedStore>, config: &QueueConfig) -> Self {
        Self::new(store, config.queue_key.clone(), RetryPolicy::from(config))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot of every resident block. Absent key means empty.
    pub async fn peek_all(&self) -> Result<Vec<ConfirmationBlock>, QueueError> {
        let raw = self.store.get(&self.key).await?;
        self.decode(raw.as_deref())
    }

    pub async fn len(&self) -> Result<usize, QueueError> {
        Ok(self.peek_all().await?.len())
    }

    /// Appends `block` unless its identifier is already resident.
    ///
    /// The uniqueness check is repeated against the freshly read value inside
    /// the compare-and-set loop, so of two concurrent submissions with the
    /// same identifier exactly one is appended.
    pub async fn enqueue(&self, block: &ValidatedBlock) -> Result<EnqueueOutcome, QueueError> {
        let identifier = block.block_identifier();
        let outcome = self
            .mutate("enqueue", |blocks| {
                if is_resident(identifier, blocks) {
                    return Mutation::Keep(EnqueueOutcome::AlreadyQueued);
                }
                blocks.push(block.as_block().clone());
                Mutation::Write(EnqueueOutcome::Enqueued {
                    depth: blocks.len(),
                })
            })
            .await?;

        debug!(block_identifier = %identifier, ?outcome, "Enqueue finished");
        Ok(outcome)
    }

    /// Removes every block whose identifier is in `identifiers`.
    ///
    /// Returns the removed blocks in queue order.
    pub async fn remove(
        &self,
        identifiers: &[BlockIdentifier],
    ) -> Result<Vec<ConfirmationBlock>, QueueError> {
        self.mutate("remove", |blocks| {
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(blocks)
                .into_iter()
                .partition(|b| identifiers.contains(&b.block_identifier));
            *blocks = kept;
            if removed.is_empty() {
                Mutation::Keep(removed)
            } else {
                Mutation::Write(removed)
            }
        })
        .await
    }

    /// Removes and returns the block with `identifier`, if resident.
    pub async fn take(
        &self,
        identifier: &BlockIdentifier,
    ) -> Result<Option<ConfirmationBlock>, QueueError> {
        let mut removed = self.remove(std::slice::from_ref(identifier)).await?;
        Ok(removed.pop())
    }

    /// Drops every resident block; returns how many were dropped.
    pub async fn clear(&self) -> Result<usize, QueueError> {
        self.mutate("clear", |blocks| {
            let count = blocks.len();
            blocks.clear();
            if count == 0 {
                Mutation::Keep(0)
            } else {
                Mutation::Write(count)
            }
        })
        .await
    }

    /// Compare-and-set loop shared by every mutation.
    async fn mutate<R, F>(&self, op: &'static str, mut f: F) -> Result<R, QueueError>
    where
        F: FnMut(&mut Vec<ConfirmationBlock>) -> Mutation<R> + Send,
        R: Send,
    {
        let mut current = self.store.get(&self.key).await?;

        for attempt in 1..=self.retry.max_attempts {
            let mut blocks = self.decode(current.as_deref())?;

            let result = match f(&mut blocks) {
                Mutation::Keep(result) => return Ok(result),
                Mutation::Write(result) => result,
            };
            debug_assert!(identifiers_unique(&blocks));

            let replacement = if blocks.is_empty() {
                None
            } else {
                Some(self.encode(&blocks)?)
            };

            match self
                .store
                .compare_and_set(&self.key, current.as_deref(), replacement)
                .await?
            {
                CasOutcome::Swapped => return Ok(result),
                CasOutcome::Conflict { current: latest } => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        key = %self.key,
                        op,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        "Queue write lost compare-and-set race, retrying"
                    );
                    current = latest;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(QueueError::Transient {
            key: self.key.clone(),
            attempts: self.retry.max_attempts,
        })
    }

    fn decode(&self, raw: Option<&[u8]>) -> Result<Vec<ConfirmationBlock>, QueueError> {
        match raw {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(bytes).map_err(|e| QueueError::Corrupt {
                key: self.key.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn encode(&self, blocks: &[ConfirmationBlock]) -> Result<Vec<u8>, QueueError> {
        serde_json::to_vec(blocks).map_err(|e| QueueError::Corrupt {
            key: self.key.clone(),
            reason: e.to_string(),
        })
    }
}
