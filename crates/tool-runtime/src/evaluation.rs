//! Stateless variant of the conversation loop used by the evaluation harness.

use std::sync::Arc;
use tracing::debug;

use crate::agent::{AgentCore, AgentError, NextStep, DEFAULT_MAX_TURNS};
use crate::message::Message;

/// Runs one input through the model/tool loop entirely in memory.
///
/// Nothing is persisted and nothing is suspended: a request for a sensitive
/// tool ends the case without the tool ever running.
pub struct EvalOrchestrator {
    core: Arc<AgentCore>,
    max_turns: usize,
}

impl EvalOrchestrator {
    pub fn new(core: Arc<AgentCore>) -> Self {
        Self {
            core,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Returns every message produced for `input`, starting with the user message.
    pub async fn run(&self, input: &str) -> Result<Vec<Message>, AgentError> {
        let mut messages = vec![Message::user(input)];

        for turn in 0..self.max_turns {
            let reply = self.core.model_turn(&messages).await?;
            let step = self.core.next_step(&reply)?;
            messages.push(reply.into());

            match step {
                NextStep::Finish | NextStep::AwaitApproval(_) => {
                    debug!(turn, messages = messages.len(), "Evaluation case finished");
                    return Ok(messages);
                }
                NextStep::Execute(call) => {
                    let result = self.core.execute(&call, input).await?;
                    messages.push(result);
                }
            }
        }

        Err(AgentError::TurnLimitExceeded(self.max_turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::AssistantMessage;
    use crate::permission::PermissionPolicy;
    use crate::provider::mock::MockLlmProvider;
    use crate::registry::ToolRegistry;
    use crate::tool::EchoTool;
    use serde_json::json;

    fn setup() -> (EvalOrchestrator, Arc<MockLlmProvider>) {
        let provider = Arc::new(MockLlmProvider::new());
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        let core = AgentCore::new(
            provider.clone(),
            Arc::new(registry),
            PermissionPolicy::default(),
        );
        (EvalOrchestrator::new(Arc::new(core)), provider)
    }

    #[tokio::test]
    async fn test_final_answer_ends_case() {
        let (eval, provider) = setup();
        provider.queue_text("4");

        let messages = eval.run("2+2?").await.unwrap();
        assert_eq!(
            messages,
            vec![Message::user("2+2?"), AssistantMessage::text("4").into()]
        );
    }

    #[tokio::test]
    async fn test_tool_calls_run_inline() {
        let (eval, provider) = setup();
        provider.queue_tool_call("call_1", "echo", json!({"message": "hi"}));
        provider.queue_text("said hi");

        let messages = eval.run("say hi").await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2], Message::tool("call_1", "hi"));
    }

    #[tokio::test]
    async fn test_sensitive_call_ends_case_without_running() {
        let (eval, provider) = setup();
        provider.queue_tool_call("call_img", "generate_image", json!({"prompt": "cat"}));

        // generate_image is not registered; running it would fail.
        let messages = eval.run("draw a cat").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(provider.approval_replies().is_empty());
        let last = messages[1].as_assistant().unwrap();
        assert_eq!(last.first_tool_call().unwrap().name(), "generate_image");
    }

    #[tokio::test]
    async fn test_cases_do_not_share_state() {
        let (eval, provider) = setup();
        provider.queue_text("first");
        provider.queue_text("second");

        eval.run("one").await.unwrap();
        eval.run("two").await.unwrap();
        let requests = provider.requests();
        assert_eq!(requests[1], vec![Message::user("two")]);
    }
}
