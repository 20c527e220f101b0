//! Confirmation Block Service
//!
//! Main service implementing ConfirmationBlockApi.
//!
//! ```text
//! Submitted ──→ Validating ──→ Rejected(reason)
//!                   │
//!                   └──→ Accepted ──→ Enqueued ──→ TriggerScheduled | NoTrigger
//! ```

use crate::application::head::HeadPointer;
use crate::application::queue::{ConfirmationQueue, EnqueueOutcome};
use crate::config::QueueConfig;
use crate::domain::entities::{ConfirmationBlock, UnvalidatedConfirmationBlock};
use crate::domain::errors::{QueueError, SubmitError, ValidationError};
use crate::domain::validator;
use crate::domain::value_objects::{
    BlockIdentifier, HeadAdvancementRequest, SubmitOutcome, TriggerDecision,
};
use crate::ports::inbound::ConfirmationBlockApi;
use crate::ports::outbound::{HeadAdvancementScheduler, SharedStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confirmation Block Service
///
/// Orchestrates a submission:
/// 1. Structural validation
/// 2. Uniqueness and balance-set validation against a queue snapshot
/// 3. Compare-and-set enqueue (re-checks uniqueness)
/// 4. Head comparison and trigger scheduling
pub struct ConfirmationBlockService {
    queue: ConfirmationQueue,
    head: HeadPointer,
    scheduler: Arc<dyn HeadAdvancementScheduler>,
}

impl ConfirmationBlockService {
    pub fn new(
        queue: ConfirmationQueue,
        head: HeadPointer,
        scheduler: Arc<dyn HeadAdvancementScheduler>,
    ) -> Self {
        Self {
            queue,
            head,
            scheduler,
        }
    }

    /// Builds the queue and head pointer over `store` using `config` keys.
    pub fn from_config(
        store: Arc<dyn SharedStore>,
        scheduler: Arc<dyn HeadAdvancementScheduler>,
        config: &QueueConfig,
    ) -> Self {
        Self::new(
            ConfirmationQueue::from_config(store.clone(), config),
            HeadPointer::new(store, config.head_key.clone()),
            scheduler,
        )
    }

    pub fn queue(&self) -> &ConfirmationQueue {
        &self.queue
    }

    pub fn head(&self) -> &HeadPointer {
        &self.head
    }

    async fn try_submit(
        &self,
        input: UnvalidatedConfirmationBlock,
    ) -> Result<SubmitOutcome, SubmitError> {
        let block = validator::parse_structure(input)?;
        debug!(block_identifier = %block.block_identifier, "Structure valid");

        let resident = self.queue.peek_all().await?;
        let validated = validator::admit(block, &resident)?;
        let block_identifier = validated.block_identifier().clone();

        let queue_depth = match self.queue.enqueue(&validated).await? {
            EnqueueOutcome::Enqueued { depth } => depth,
            // A concurrent submission with the same identifier won the race.
            EnqueueOutcome::AlreadyQueued => {
                return Err(ValidationError::DuplicateBlock(block_identifier).into());
            }
        };

        info!(
            block_identifier = %block_identifier,
            queue_depth,
            "Confirmation block enqueued"
        );

        let trigger = self.decide_trigger(&block_identifier).await;

        Ok(SubmitOutcome {
            block_identifier,
            queue_depth,
            trigger,
        })
    }

    /// Schedules head advancement when `block_identifier` is the head.
    ///
    /// The head is read once, after the enqueue. A stale read only delays the
    /// trigger until the next submission or sweep, so failures here are
    /// logged and never fail the submission.
    async fn decide_trigger(&self, block_identifier: &BlockIdentifier) -> TriggerDecision {
        let head = match self.head.get().await {
            Ok(Some(head)) => head,
            Ok(None) => return TriggerDecision::NoTrigger,
            Err(err) => {
                warn!(error = %err, "Could not read head pointer, skipping trigger");
                return TriggerDecision::NoTrigger;
            }
        };

        if &head != block_identifier {
            return TriggerDecision::NoTrigger;
        }

        let request = HeadAdvancementRequest::new(head);
        let correlation_id = request.correlation_id;
        match self.scheduler.schedule(request) {
            Ok(()) => {
                info!(
                    %correlation_id,
                    head_block_hash = %block_identifier,
                    "Head advancement scheduled"
                );
                TriggerDecision::Scheduled { correlation_id }
            }
            Err(err) => {
                warn!(
                    %correlation_id,
                    head_block_hash = %block_identifier,
                    error = %err,
                    "Failed to schedule head advancement"
                );
                TriggerDecision::ScheduleFailed
            }
        }
    }
}

#[async_trait]
impl ConfirmationBlockApi for ConfirmationBlockService {
    async fn submit(
        &self,
        input: UnvalidatedConfirmationBlock,
    ) -> Result<SubmitOutcome, SubmitError> {
        let result = self.try_submit(input).await;
        if let Err(err) = &result {
            warn!(
                rule = err.rule(),
                field = err.field().unwrap_or("-"),
                error = %err,
                "Confirmation block rejected"
            );
        }
        result
    }

    async fn pending_blocks(&self) -> Result<Vec<ConfirmationBlock>, QueueError> {
        self.queue.peek_all().await
    }

    async fn head_block_hash(&self) -> Result<Option<BlockIdentifier>, QueueError> {
        self.head.get().await
    }
}
