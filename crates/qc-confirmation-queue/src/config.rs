//! Configuration for the Confirmation Queue

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Store key holding the pending confirmation blocks.
pub const CONFIRMATION_BLOCK_QUEUE: &str = "CONFIRMATION_BLOCK_QUEUE";

/// Store key holding the identifier of the last committed block.
pub const HEAD_BLOCK_HASH: &str = "HEAD_BLOCK_HASH";

/// Queue configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Store key of the queue
    pub queue_key: String,
    /// Store key of the head pointer
    pub head_key: String,
    /// Compare-and-set attempts before giving up with a transient error
    pub max_enqueue_attempts: u32,
    /// Backoff after the first lost compare-and-set (milliseconds)
    pub initial_backoff_ms: u64,
    /// Upper bound for the exponential backoff (milliseconds)
    pub max_backoff_ms: u64,
    /// Pending head advancement requests before scheduling fails
    pub trigger_channel_capacity: usize,
    /// Periodic sweep of the head advancer; disabled when `None`
    pub sweep_interval_ms: Option<u64>,
}

impl QueueConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_ms.map(Duration::from_millis)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_key: CONFIRMATION_BLOCK_QUEUE.to_string(),
            head_key: HEAD_BLOCK_HASH.to_string(),
            max_enqueue_attempts: 8,
            initial_backoff_ms: 5,
            max_backoff_ms: 200,
            trigger_channel_capacity: 1024,
            sweep_interval_ms: None,
        }
    }
}
