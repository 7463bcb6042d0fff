use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::{AgentCore, AgentError};
use crate::message::{Message, ToolCall};

/// Tool response recorded when the user declines a sensitive call.
pub const DENIAL_MESSAGE: &str = "User did not approve image generation at this time.";

/// Outcome of asking the user whether a sensitive tool may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Approved,
    Denied,
}

/// Resolves a suspended sensitive tool call from the user's free-text reply.
pub struct ApprovalGate<'a> {
    core: &'a AgentCore,
}

impl<'a> ApprovalGate<'a> {
    pub fn new(core: &'a AgentCore) -> Self {
        Self { core }
    }

    /// Classify `reply` and produce the single `tool` message that answers `pending`.
    ///
    /// On approval the tool runs and its output becomes the response; on
    /// denial the tool is never invoked and [`DENIAL_MESSAGE`] is recorded.
    pub async fn resolve(
        &self,
        pending: &ToolCall,
        reply: &str,
    ) -> Result<(ApprovalDecision, Message), AgentError> {
        let approved = self.core.provider().classify_approval(reply).await?;
        if approved {
            info!(tool = pending.name(), call_id = %pending.id, "Tool call approved");
            let message = self.core.execute(pending, reply).await?;
            Ok((ApprovalDecision::Approved, message))
        } else {
            info!(tool = pending.name(), call_id = %pending.id, "Tool call denied");
            Ok((
                ApprovalDecision::Denied,
                Message::tool(pending.id.clone(), DENIAL_MESSAGE),
            ))
        }
    }
}
