//! IPC Handler for the Confirmation Queue
//!
//! Decodes request bodies and delegates to the `ConfirmationBlockApi`.
//! Every outcome, including an undecodable body, is turned into a
//! `SubmitConfirmationBlockResponse`.

use crate::domain::entities::UnvalidatedConfirmationBlock;
use crate::domain::errors::StructuralReason;
use crate::ipc::payloads::SubmitConfirmationBlockResponse;
use crate::ports::inbound::ConfirmationBlockApi;
use std::sync::Arc;
use tracing::{debug, warn};

/// IPC Handler for confirmation block submissions.
pub struct ConfirmationBlockHandler {
    api: Arc<dyn ConfirmationBlockApi>,
}

impl ConfirmationBlockHandler {
    pub fn new(api: Arc<dyn ConfirmationBlockApi>) -> Self {
        Self { api }
    }

    /// Handle a JSON encoded confirmation block.
    pub async fn handle_submit(&self, body: &[u8]) -> SubmitConfirmationBlockResponse {
        let input = match decode(body) {
            Ok(input) => input,
            Err((field, reason)) => {
                warn!(
                    error = %reason,
                    field = field.as_deref().unwrap_or("-"),
                    bytes = body.len(),
                    "Undecodable confirmation block"
                );
                return SubmitConfirmationBlockResponse::rejected(
                    "structural",
                    field.as_deref(),
                    StructuralReason::Malformed(reason).to_string(),
                );
            }
        };

        debug!(block_identifier = %input.block_identifier, "Handling submission");

        match self.api.submit(input).await {
            Ok(outcome) => outcome.into(),
            Err(err) => SubmitConfirmationBlockResponse::from(&err),
        }
    }
}

/// Decodes a request body, tracking the path of the field that failed.
fn decode(body: &[u8]) -> Result<UnvalidatedConfirmationBlock, (Option<String>, String)> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let input = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| (field_path(&e), e.inner().to_string()))?;
    deserializer.end().map_err(|e| (None, e.to_string()))?;
    Ok(input)
}

/// Path of the field that failed to decode, `None` when the body itself is
/// not a JSON object.
///
/// A missing field is reported at the enclosing object, so its name is
/// appended from the error message.
fn field_path(err: &serde_path_to_error::Error<serde_json::Error>) -> Option<String> {
    let path = err.path().to_string();
    let parent = (path != ".").then_some(path);
    let missing = err
        .inner()
        .to_string()
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
        .map(str::to_string);

    match (parent, missing) {
        (Some(parent), Some(missing)) => Some(format!("{parent}.{missing}")),
        (parent, missing) => parent.or(missing),
    }
}
