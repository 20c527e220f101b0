//! # Confirmation Queue
//!
//! **Architecture:** Hexagonal, same layering as the other subsystem crates
//!
//! ## Purpose
//!
//! Accepts confirmation blocks from the primary validator, validates them,
//! stages them in an ordered queue held in a shared key-value store, and
//! schedules head advancement when the incoming block is the one the ledger
//! is waiting for.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Block identifiers unique in the queue | `domain/validator.rs` `check_unique`, re-checked in `ConfirmationQueue::enqueue` |
//! | Account numbers distinct within a block | `domain/validator.rs` `check_balance_set` |
//! | Exactly one balance lock per block | `domain/validator.rs` `check_balance_set` |
//! | No lost updates under concurrent enqueue | `application/queue.rs` compare-and-set loop |
//! | Trigger only when identifier equals head | `application/service.rs` `decide_trigger` |
//!
//! ## Submission Lifecycle
//!
//! ```text
//! Submitted ──→ Validating ──→ Rejected(rule)
//!                   │
//!                   └──→ Accepted ──→ Enqueued ──→ TriggerScheduled | NoTrigger
//! ```
//!
//! Validation rules are evaluated in order and the first failure wins:
//! structure, then identifier uniqueness, then the balance set.
//!
//! ## Shared Store Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `CONFIRMATION_BLOCK_QUEUE` | JSON array of confirmation blocks, oldest first |
//! | `HEAD_BLOCK_HASH` | UTF-8 identifier of the last committed block |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - InMemoryStore, ChannelScheduler                   │
//! │  ipc/      - JSON request handler and response payloads        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - ConfirmationBlockApi trait                │
//! │  ports/outbound.rs - SharedStore, HeadAdvancementScheduler,    │
//! │                      HeadAdvancer traits                       │
//! │  application/      - queue, head pointer, service, worker      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs     - ConfirmationBlock, UpdatedBalance    │
//! │  domain/value_objects.rs - bounded identifiers, Balance        │
//! │  domain/validator.rs    - ordered validation rules             │
//! │  domain/invariants.rs   - shared predicates                    │
//! │  domain/errors.rs       - error enums                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::{ChannelScheduler, InMemoryStore};
pub use application::{
    ConfirmationBlockService, ConfirmationQueue, EnqueueOutcome, HeadAdvancementWorker,
    HeadPointer, RetryPolicy,
};
pub use config::QueueConfig;
pub use domain::entities::*;
pub use domain::errors::*;
pub use domain::value_objects::*;
pub use ipc::{ConfirmationBlockHandler, SubmitConfirmationBlockResponse, TriggerStatus};
pub use ports::inbound::ConfirmationBlockApi;
pub use ports::outbound::{CasOutcome, HeadAdvancementScheduler, HeadAdvancer, SharedStore};
