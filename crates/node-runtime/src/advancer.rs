//! Reference head advancer.
//!
//! Commits blocks by walking the queue from the head: the block whose
//! identifier equals the head is removed and the head moves to the digest of
//! that block's network block. The walk stops at the first head with no
//! matching block. Balances are not applied to a ledger here.

use async_trait::async_trait;
use qc_confirmation_queue::{
    AdvanceError, AdvanceReport, BlockIdentifier, ConfirmationQueue, HeadAdvancer, HeadPointer,
};
use tracing::{debug, info};

/// `HeadAdvancer` over the same queue and head pointer the service uses.
pub struct QueueWalkingAdvancer {
    queue: ConfirmationQueue,
    head: HeadPointer,
}

impl QueueWalkingAdvancer {
    pub fn new(queue: ConfirmationQueue, head: HeadPointer) -> Self {
        Self { queue, head }
    }
}

#[async_trait]
impl HeadAdvancer for QueueWalkingAdvancer {
    async fn advance(&self, head: &BlockIdentifier) -> Result<AdvanceReport, AdvanceError> {
        let mut report = AdvanceReport::default();
        let mut current = head.clone();

        loop {
            let pending = self.queue.peek_all().await?;
            let Some(block) = pending.iter().find(|b| b.block_identifier == current) else {
                break;
            };

            let next = block.block.digest().map_err(|e| AdvanceError::Hashing {
                block_identifier: current.clone(),
                reason: e.to_string(),
            })?;

            // Another advancer may have committed it in the meantime.
            if self.queue.take(&current).await?.is_none() {
                debug!(block_identifier = %current, "Block already committed");
                break;
            }

            self.head.set(&next).await?;
            info!(committed = %current, head_block_hash = %next, "Block committed");
            report.committed.push(current);
            current = next;
        }

        if !report.committed.is_empty() {
            report.head_block_hash = Some(current);
        }
        Ok(report)
    }
}
