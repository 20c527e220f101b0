//! Ports module for the Confirmation Queue
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::ConfirmationBlockApi;
pub use outbound::{CasOutcome, HeadAdvancementScheduler, HeadAdvancer, SharedStore};
