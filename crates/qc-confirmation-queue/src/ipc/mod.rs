//! IPC Module for the Confirmation Queue
//!
//! ## Boundaries
//!
//! - Accept: confirmation blocks as JSON request bodies
//! - Reply: `SubmitConfirmationBlockResponse`, accepted or rejected with the
//!   failing rule
//! - Send: nothing; head advancement goes through the scheduler port

pub mod handler;
pub mod payloads;

pub use handler::ConfirmationBlockHandler;
pub use payloads::*;
