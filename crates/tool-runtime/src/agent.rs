//! The model/tool step shared by the interactive and evaluation loops.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatch::{DispatchError, ToolDispatcher};
use crate::history::HistoryError;
use crate::message::{AssistantMessage, Message, ToolCall};
use crate::permission::PermissionPolicy;
use crate::provider::{LlmError, ToolAwareLlmProvider};
use crate::registry::ToolRegistry;

/// Default upper bound on model calls per invocation.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// What to do after the model has replied.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// The reply is a final answer.
    Finish,
    /// The first tool call needs human approval before it may run.
    AwaitApproval(ToolCall),
    /// The first tool call may run right away.
    Execute(ToolCall),
}

/// Model transport, tool dispatch and permission policy bundled together.
///
/// Both orchestrators drive their loops through this type so tool-call
/// detection and dispatch exist in one place.
pub struct AgentCore {
    provider: Arc<dyn ToolAwareLlmProvider>,
    dispatcher: ToolDispatcher,
    policy: PermissionPolicy,
}

impl AgentCore {
    pub fn new(
        provider: Arc<dyn ToolAwareLlmProvider>,
        registry: Arc<ToolRegistry>,
        policy: PermissionPolicy,
    ) -> Self {
        Self {
            provider,
            dispatcher: ToolDispatcher::new(registry),
            policy,
        }
    }

    pub fn provider(&self) -> &Arc<dyn ToolAwareLlmProvider> {
        &self.provider
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// Ask the model for its next message given `history` and every registered tool.
    pub async fn model_turn(&self, history: &[Message]) -> Result<AssistantMessage, AgentError> {
        let tools = self.dispatcher.definitions();
        debug!(
            provider = self.provider.provider_name(),
            messages = history.len(),
            tools = tools.len(),
            "Calling model"
        );
        Ok(self.provider.complete_with_tools(history, &tools).await?)
    }

    /// Classify an assistant reply.
    ///
    /// Only the first tool call is considered; any further calls in the same
    /// message are ignored.
    pub fn next_step(&self, reply: &AssistantMessage) -> Result<NextStep, AgentError> {
        if reply.is_final() {
            return Ok(NextStep::Finish);
        }
        let call = reply.first_tool_call().ok_or_else(|| {
            AgentError::MalformedModelResponse(
                "assistant message has neither content nor tool calls".to_string(),
            )
        })?;
        if reply.tool_calls.len() > 1 {
            warn!(
                acting_on = call.name(),
                ignored = reply.tool_calls.len() - 1,
                "Assistant requested several tool calls; only the first is executed"
            );
        }
        if self.policy.requires_confirmation(call.name()) {
            Ok(NextStep::AwaitApproval(call.clone()))
        } else {
            Ok(NextStep::Execute(call.clone()))
        }
    }

    /// Run `call` and wrap its output as the answering `tool` message.
    pub async fn execute(
        &self,
        call: &ToolCall,
        user_message: &str,
    ) -> Result<Message, AgentError> {
        let output = self.dispatcher.dispatch(call, user_message).await?;
        Ok(Message::tool(call.id.clone(), output))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("Malformed model response: {0}")]
    MalformedModelResponse(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("Turn limit ({0}) exceeded")]
    TurnLimitExceeded(usize),
}
