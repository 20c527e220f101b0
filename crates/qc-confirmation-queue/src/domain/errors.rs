//! Error types for the Confirmation Queue.
//!
//! Validation errors are reported synchronously to the submitter and never
//! retried here. Queue contention is retried inside the queue and only
//! surfaces as `QueueError::Transient` once the retry budget is spent.

use super::value_objects::{AccountNumber, BlockIdentifier};
use thiserror::Error;

/// Why a field failed structural validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StructuralReason {
    #[error("may not be blank")]
    Blank,

    #[error("ensure this field has no more than {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("a valid number is required")]
    InvalidDecimal,

    #[error("ensure that there are no more than {max} digits in total")]
    TooManyDigits { max: u64 },

    #[error("ensure that there are no more than {max} decimal places")]
    TooManyDecimalPlaces { max: u64 },

    #[error("ensure that there are no more than {max} digits before the decimal point")]
    TooManyWholeDigits { max: u64 },

    #[error("numeric values may carry at most {max} significant digits, send longer ones as strings")]
    ImpreciseNumber { max: usize },

    #[error("ensure this value is greater than or equal to {min}")]
    BelowMinimum { min: i64 },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Which balance-set rule a block broke.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BalanceSetViolation {
    /// Two updated balances name the same account.
    #[error("account {account} appears more than once in updated_balances")]
    DuplicateAccount { account: AccountNumber },

    /// The block must carry exactly one balance lock (the sender's).
    #[error("should contain exactly 1 balance lock, found {found}")]
    WrongLockCount { found: usize },
}

impl BalanceSetViolation {
    pub fn sub_reason(&self) -> &'static str {
        match self {
            Self::DuplicateAccount { .. } => "duplicate_account",
            Self::WrongLockCount { .. } => "wrong_lock_count",
        }
    }
}

/// Rejection of a submitted confirmation block. The first failing rule wins.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    Structural {
        field: String,
        reason: StructuralReason,
    },

    #[error("confirmation block with block_identifier {0} already exists")]
    DuplicateBlock(BlockIdentifier),

    #[error("invalid updated_balances: {0}")]
    InvalidBalanceSet(BalanceSetViolation),
}

impl ValidationError {
    pub fn structural(field: impl Into<String>, reason: StructuralReason) -> Self {
        Self::Structural {
            field: field.into(),
            reason,
        }
    }

    /// Stable name of the rule that rejected the block.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Structural { .. } => "structural",
            Self::DuplicateBlock(_) => "duplicate_block",
            Self::InvalidBalanceSet(_) => "invalid_balance_set",
        }
    }

    /// Path of the offending field, when one can be named.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Structural { field, .. } => Some(field),
            Self::DuplicateBlock(_) => Some("block_identifier"),
            Self::InvalidBalanceSet(_) => Some("updated_balances"),
        }
    }
}

/// Shared store failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Queue operation failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Compare-and-set kept losing to concurrent writers.
    #[error("queue {key} still contended after {attempts} attempts")]
    Transient { key: String, attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The value under the key could not be decoded.
    #[error("value under {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Failure to hand a head advancement request to the worker.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("head advancement channel is full")]
    ChannelFull,

    #[error("head advancement worker is gone")]
    WorkerGone,
}

/// Failure inside a head advancement run.
#[derive(Debug, Error)]
pub enum AdvanceError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("failed to hash block {block_identifier}: {reason}")]
    Hashing {
        block_identifier: BlockIdentifier,
        reason: String,
    },
}

/// Everything `submit` can fail with.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl SubmitError {
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.rule(),
            Self::Queue(QueueError::Transient { .. }) => "transient_queue",
            Self::Queue(_) => "store",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.field(),
            Self::Queue(_) => None,
        }
    }
}
