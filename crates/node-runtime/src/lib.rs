//! # Node Runtime Library
//!
//! Wires the confirmation queue subsystem into a runnable node. The main
//! entry point is the `main.rs` binary; the library exposes the pieces for
//! integration tests.
//!
//! ## Modules
//!
//! - `advancer` - reference `HeadAdvancer` that walks the queue from the head
//! - `config` - runtime configuration loaded from `QC_*` variables
//! - `runtime` - store, service, worker and request loop

pub mod advancer;
pub mod config;
pub mod runtime;

pub use advancer::QueueWalkingAdvancer;
pub use config::RuntimeConfig;
pub use runtime::NodeRuntime;
