//! # Application Layer
//!
//! Queue and head pointer over the shared store, the submission service and
//! the head advancement worker.

pub mod head;
pub mod queue;
pub mod service;
pub mod worker;

pub use head::HeadPointer;
pub use queue::{ConfirmationQueue, EnqueueOutcome, RetryPolicy};
pub use service::ConfirmationBlockService;
pub use worker::HeadAdvancementWorker;
