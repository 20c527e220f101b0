//! # Confirmation Queue Node
//!
//! Reads confirmation blocks as newline-delimited JSON on stdin and writes
//! one JSON response per block to stdout. Logs go to stderr; set `RUST_LOG`
//! to change the filter.
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `QC_QUEUE_KEY` | Store key of the queue |
//! | `QC_HEAD_KEY` | Store key of the head pointer |
//! | `QC_MAX_ENQUEUE_ATTEMPTS` | Compare-and-set attempts per enqueue |
//! | `QC_INITIAL_BACKOFF_MS` / `QC_MAX_BACKOFF_MS` | Retry backoff bounds |
//! | `QC_TRIGGER_CHANNEL_CAPACITY` | Pending head advancement requests |
//! | `QC_SWEEP_INTERVAL_MS` | Periodic sweep, disabled when unset or 0 |
//! | `QC_INITIAL_HEAD` | Head pointer seeded at startup |

use anyhow::Result;
use node_runtime::{NodeRuntime, RuntimeConfig};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();
    let runtime = NodeRuntime::start(config).await?;

    info!("Node is running. Reading confirmation blocks from stdin.");
    tokio::select! {
        result = runtime.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()) => {
            match result {
                Ok(handled) => info!(handled, "Input closed"),
                Err(e) => error!(error = ?e, "Request loop failed"),
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted"),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        }
    }

    runtime.shutdown().await;

    Ok(())
}
