//! IPC Payloads for the Confirmation Queue
//!
//! Requests are `UnvalidatedConfirmationBlock` bodies; only responses are
//! defined here.

use crate::domain::errors::SubmitError;
use crate::domain::value_objects::{SubmitOutcome, TriggerDecision};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Response to a confirmation block submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitConfirmationBlockResponse {
    Accepted {
        block_identifier: String,
        /// Resident blocks right after the enqueue
        queue_depth: usize,
        trigger: TriggerStatus,
        /// Set when a head advancement request was queued
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correlation_id: Option<Uuid>,
    },
    Rejected {
        /// `structural`, `duplicate_block`, `invalid_balance_set`,
        /// `transient_queue` or `store`
        rule: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        message: String,
    },
}

impl SubmitConfirmationBlockResponse {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejected(rule: &str, field: Option<&str>, message: impl Into<String>) -> Self {
        Self::Rejected {
            rule: rule.to_string(),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<SubmitOutcome> for SubmitConfirmationBlockResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        let correlation_id = match outcome.trigger {
            TriggerDecision::Scheduled { correlation_id } => Some(correlation_id),
            _ => None,
        };
        Self::Accepted {
            block_identifier: outcome.block_identifier.into_inner(),
            queue_depth: outcome.queue_depth,
            trigger: outcome.trigger.into(),
            correlation_id,
        }
    }
}

impl From<&SubmitError> for SubmitConfirmationBlockResponse {
    fn from(err: &SubmitError) -> Self {
        Self::rejected(err.rule(), err.field(), err.to_string())
    }
}

/// Trigger decision as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    Scheduled,
    NoTrigger,
    ScheduleFailed,
}

impl From<TriggerDecision> for TriggerStatus {
    fn from(decision: TriggerDecision) -> Self {
        match decision {
            TriggerDecision::Scheduled { .. } => Self::Scheduled,
            TriggerDecision::NoTrigger => Self::NoTrigger,
            TriggerDecision::ScheduleFailed => Self::ScheduleFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{QueueError, ValidationError};
    use crate::domain::value_objects::BlockIdentifier;
    use serde_json::json;

    #[test]
    fn test_accepted_response_serialization() {
        let correlation_id = Uuid::new_v4();
        let response = SubmitConfirmationBlockResponse::from(SubmitOutcome {
            block_identifier: BlockIdentifier::parse("id", "H0").unwrap(),
            queue_depth: 3,
            trigger: TriggerDecision::Scheduled { correlation_id },
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "accepted",
                "block_identifier": "H0",
                "queue_depth": 3,
                "trigger": "scheduled",
                "correlation_id": correlation_id.to_string(),
            })
        );
    }

    #[test]
    fn test_rejected_response_carries_rule_and_field() {
        let err = SubmitError::Validation(ValidationError::DuplicateBlock(
            BlockIdentifier::parse("id", "A").unwrap(),
        ));
        let value = serde_json::to_value(SubmitConfirmationBlockResponse::from(&err)).unwrap();

        assert_eq!(value["status"], "rejected");
        assert_eq!(value["rule"], "duplicate_block");
        assert_eq!(value["field"], "block_identifier");
    }

    #[test]
    fn test_transient_rejection_has_no_field() {
        let err = SubmitError::Queue(QueueError::Transient {
            key: "CONFIRMATION_BLOCK_QUEUE".into(),
            attempts: 8,
        });
        let value = serde_json::to_value(SubmitConfirmationBlockResponse::from(&err)).unwrap();

        assert_eq!(value["rule"], "transient_queue");
        assert!(value.get("field").is_none());
    }
}
