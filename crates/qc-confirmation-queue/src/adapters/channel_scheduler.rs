//! Channel-backed head advancement scheduler.
//!
//! Requests go into a bounded tokio mpsc channel drained by
//! `HeadAdvancementWorker`. Sending never blocks the submitter.

use crate::domain::errors::ScheduleError;
use crate::domain::value_objects::HeadAdvancementRequest;
use crate::ports::outbound::HeadAdvancementScheduler;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Sends head advancement requests to the worker channel.
#[derive(Clone, Debug)]
pub struct ChannelScheduler {
    sender: mpsc::Sender<HeadAdvancementRequest>,
}

impl ChannelScheduler {
    /// Creates the scheduler and the receiving end for the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<HeadAdvancementRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl HeadAdvancementScheduler for ChannelScheduler {
    fn schedule(&self, request: HeadAdvancementRequest) -> Result<(), ScheduleError> {
        let correlation_id = request.correlation_id;
        self.sender.try_send(request).map_err(|err| match err {
            TrySendError::Full(_) => ScheduleError::ChannelFull,
            TrySendError::Closed(_) => ScheduleError::WorkerGone,
        })?;
        debug!(%correlation_id, "Head advancement request queued");
        Ok(())
    }
}
