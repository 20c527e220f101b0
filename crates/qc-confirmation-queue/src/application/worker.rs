//! Head Advancement Worker
//!
//! Consumes `HeadAdvancementRequest`s from the scheduler channel and drives
//! the `HeadAdvancer`. Runs detached from submitters: nothing a submitter
//! does cancels a run once it started.
//!
//! With a sweep interval configured, the worker also advances from the
//! current head periodically, which recovers triggers that were dropped
//! because the channel was full or the head read was stale.

use crate::application::head::HeadPointer;
use crate::domain::value_objects::{BlockIdentifier, HeadAdvancementRequest};
use crate::ports::outbound::HeadAdvancer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

const IDLE_SWEEP: Duration = Duration::from_secs(24 * 60 * 60);

/// Drains head advancement requests until shutdown.
pub struct HeadAdvancementWorker {
    requests: mpsc::Receiver<HeadAdvancementRequest>,
    advancer: Arc<dyn HeadAdvancer>,
    head: HeadPointer,
    sweep_interval: Option<Duration>,
    shutdown: watch::Receiver<bool>,
}

impl HeadAdvancementWorker {
    pub fn new(
        requests: mpsc::Receiver<HeadAdvancementRequest>,
        advancer: Arc<dyn HeadAdvancer>,
        head: HeadPointer,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            requests,
            advancer,
            head,
            sweep_interval: None,
            shutdown,
        }
    }

    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until shutdown is signalled or every scheduler is dropped.
    pub async fn run(mut self) {
        info!(sweep_interval = ?self.sweep_interval, "Head advancement worker started");

        // A disabled sweep still needs a timer to select on; it just never fires.
        let mut sweep = tokio::time::interval(self.sweep_interval.unwrap_or(IDLE_SWEEP));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        sweep.reset();

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                request = self.requests.recv() => {
                    let Some(request) = request else {
                        debug!("All schedulers dropped");
                        break;
                    };
                    self.handle(request).await;
                }
                _ = sweep.tick(), if self.sweep_interval.is_some() => {
                    self.sweep().await;
                }
            }
        }

        info!("Head advancement worker stopped");
    }

    async fn handle(&self, request: HeadAdvancementRequest) {
        debug!(
            correlation_id = %request.correlation_id,
            head_block_hash = %request.head_block_hash,
            "Head advancement requested"
        );
        self.advance(&request.head_block_hash).await;
    }

    async fn sweep(&self) {
        match self.head.get().await {
            Ok(Some(head)) => self.advance(&head).await,
            Ok(None) => debug!("Sweep skipped, no head set"),
            Err(err) => error!(error = %err, "Sweep could not read head pointer"),
        }
    }

    async fn advance(&self, head: &BlockIdentifier) {
        match self.advancer.advance(head).await {
            Ok(report) if report.is_noop() => {
                debug!(head_block_hash = %head, "Nothing to commit");
            }
            Ok(report) => {
                info!(
                    from = %head,
                    committed = report.committed.len(),
                    head_block_hash = ?report.head_block_hash.as_ref().map(BlockIdentifier::as_str),
                    "Head advanced"
                );
            }
            Err(err) => {
                error!(head_block_hash = %head, error = %err, "Head advancement failed");
            }
        }
    }
}
