//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{ConfirmationBlock, UnvalidatedConfirmationBlock};
use crate::domain::errors::{QueueError, SubmitError};
use crate::domain::value_objects::{BlockIdentifier, SubmitOutcome};
use async_trait::async_trait;

/// Primary Confirmation Queue API
///
/// # Example
///
/// ```rust,ignore
/// use qc_confirmation_queue::ports::ConfirmationBlockApi;
///
/// async fn example(api: &impl ConfirmationBlockApi, payload: UnvalidatedConfirmationBlock) {
///     match api.submit(payload).await {
///         Ok(outcome) if outcome.trigger.is_scheduled() => { /* head may advance */ }
///         Ok(_) => { /* staged */ }
///         Err(err) => eprintln!("rejected by {}: {err}", err.rule()),
///     }
/// }
/// ```
#[async_trait]
pub trait ConfirmationBlockApi: Send + Sync {
    /// Validates and stages a confirmation block.
    ///
    /// Schedules head advancement when the block's identifier equals the
    /// current head.
    ///
    /// # Errors
    /// - `Validation(Structural)`: malformed field
    /// - `Validation(DuplicateBlock)`: identifier already queued
    /// - `Validation(InvalidBalanceSet)`: duplicate account or wrong lock count
    /// - `Queue(Transient)`: enqueue kept losing the compare-and-set race
    async fn submit(
        &self,
        input: UnvalidatedConfirmationBlock,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// Snapshot of every resident block.
    async fn pending_blocks(&self) -> Result<Vec<ConfirmationBlock>, QueueError>;

    /// Identifier of the last committed block, if any.
    async fn head_block_hash(&self) -> Result<Option<BlockIdentifier>, QueueError>;
}
