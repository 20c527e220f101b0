//! Node runtime: shared store, submission service, head advancement worker
//! and the request loop.
//!
//! ## Startup Sequence
//!
//! 1. Create the shared store and the scheduler channel
//! 2. Seed the head pointer (if configured)
//! 3. Spawn the head advancement worker
//! 4. Serve requests until input closes or the process is interrupted

use crate::advancer::QueueWalkingAdvancer;
use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use qc_confirmation_queue::{
    BlockIdentifier, ChannelScheduler, ConfirmationBlockHandler, ConfirmationBlockService,
    HeadAdvancementWorker, InMemoryStore, SharedStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The running confirmation queue node.
pub struct NodeRuntime {
    service: Arc<ConfirmationBlockService>,
    handler: ConfirmationBlockHandler,
    worker: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Start a node backed by an in-memory store.
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        Self::start_with_store(Arc::new(InMemoryStore::new()), config).await
    }

    /// Start a node over an existing shared store.
    pub async fn start_with_store(
        store: Arc<dyn SharedStore>,
        config: RuntimeConfig,
    ) -> Result<Self> {
        info!(
            queue_key = %config.queue.queue_key,
            head_key = %config.queue.head_key,
            "Starting confirmation queue node"
        );

        let (scheduler, requests) =
            ChannelScheduler::channel(config.queue.trigger_channel_capacity);
        let service = Arc::new(ConfirmationBlockService::from_config(
            store,
            Arc::new(scheduler),
            &config.queue,
        ));

        if let Some(head) = config.initial_head {
            let head = BlockIdentifier::parse("QC_INITIAL_HEAD", head)
                .context("Invalid initial head")?;
            service
                .head()
                .set(&head)
                .await
                .context("Failed to seed head pointer")?;
            info!(head_block_hash = %head, "Head pointer seeded");
        }

        let advancer = Arc::new(QueueWalkingAdvancer::new(
            service.queue().clone(),
            service.head().clone(),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker =
            HeadAdvancementWorker::new(requests, advancer, service.head().clone(), shutdown_rx)
                .with_sweep_interval(config.queue.sweep_interval())
                .spawn();

        let handler = ConfirmationBlockHandler::new(service.clone());

        Ok(Self {
            service,
            handler,
            worker,
            shutdown_tx,
        })
    }

    pub fn service(&self) -> Arc<ConfirmationBlockService> {
        Arc::clone(&self.service)
    }

    /// Answer one JSON response line per non-empty request line.
    ///
    /// Lines are passed through as raw bytes, so a line that is not UTF-8 is
    /// rejected on its own and the loop carries on. Returns the number of
    /// requests handled once `reader` is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.split(b'\n');
        let mut handled = 0;

        while let Some(line) = lines.next_segment().await.context("Failed to read request")? {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let response = self.handler.handle_submit(line).await;
            let mut encoded = serde_json::to_vec(&response).context("Failed to encode response")?;
            encoded.push(b'\n');
            writer
                .write_all(&encoded)
                .await
                .context("Failed to write response")?;
            writer.flush().await.context("Failed to flush response")?;
            handled += 1;
        }

        Ok(handled)
    }

    /// Stop the worker and wait for it, bounded by a grace period.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            warn!(error = %e, "Worker already stopped");
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.worker).await {
            Ok(Ok(())) => info!("Shutdown complete"),
            Ok(Err(e)) => error!(error = %e, "Head advancement worker failed"),
            Err(_) => warn!("Head advancement worker did not stop in time"),
        }
    }
}
