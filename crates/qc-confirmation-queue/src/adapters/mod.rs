//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for single-node operation and tests.

mod channel_scheduler;
mod memory_store;

pub use channel_scheduler::ChannelScheduler;
pub use memory_store::InMemoryStore;
