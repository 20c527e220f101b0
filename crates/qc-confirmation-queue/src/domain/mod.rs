//! # Domain Layer - Confirmation Queue
//!
//! Pure business logic: no store access, no channels.
//!
//! ## Components
//!
//! - `entities`: ConfirmationBlock, UpdatedBalance, NetworkBlock and their
//!   unvalidated wire forms
//! - `value_objects`: length-bounded identifiers, decimal Balance, trigger types
//! - `validator`: the three ordered validation rules
//! - `invariants`: predicates shared by the validator and the queue
//! - `errors`: ValidationError, QueueError and friends

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod validator;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
