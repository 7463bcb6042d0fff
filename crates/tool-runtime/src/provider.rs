use crate::message::{AssistantMessage, Message};
use crate::tool::ToolDefinition;
use async_trait::async_trait;

/// Trait for LLM providers that support tool calling.
///
/// This trait lives in tool-runtime (not in crates/llm) because it's
/// defined by the consumer (the orchestrators), not the provider.
/// Implementations live in crates/llm.
#[async_trait]
pub trait ToolAwareLlmProvider: Send + Sync {
    /// Send the history and available tools, returning one assistant message.
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, LlmError>;

    /// Yes/no classification of a free-text reply to an approval question.
    /// A secondary call made without tools.
    async fn classify_approval(&self, user_reply: &str) -> Result<bool, LlmError>;

    /// Provider name for logging/debugging (e.g., "openai", "mock")
    fn provider_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Authentication failed")]
    AuthError,
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Mock LLM provider for testing the orchestrators without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use crate::message::ToolCall;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A mock provider that returns pre-configured responses in FIFO order.
    pub struct MockLlmProvider {
        responses: Mutex<VecDeque<AssistantMessage>>,
        fallback: Option<AssistantMessage>,
        approvals: Mutex<VecDeque<bool>>,
        requests: Mutex<Vec<Vec<Message>>>,
        approval_replies: Mutex<Vec<String>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: None,
                approvals: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                approval_replies: Mutex::new(Vec::new()),
            }
        }

        /// Reply with `message` whenever the queue is empty.
        pub fn always(message: AssistantMessage) -> Self {
            Self {
                fallback: Some(message),
                ..Self::new()
            }
        }

        /// Queue a response that will be returned on the next call.
        pub fn queue_response(&self, message: AssistantMessage) {
            self.responses.lock().unwrap().push_back(message);
        }

        /// Queue a simple text response.
        pub fn queue_text(&self, text: &str) {
            self.queue_response(AssistantMessage::text(text));
        }

        /// Queue a response requesting a single tool call.
        pub fn queue_tool_call(&self, id: &str, name: &str, arguments: serde_json::Value) {
            self.queue_response(AssistantMessage::tool_calls(vec![ToolCall::new(
                id, name, arguments,
            )]));
        }

        /// Queue the outcome of the next approval classification.
        pub fn queue_approval(&self, approved: bool) {
            self.approvals.lock().unwrap().push_back(approved);
        }

        /// Histories passed to `complete_with_tools`, in call order.
        pub fn requests(&self) -> Vec<Vec<Message>> {
            self.requests.lock().unwrap().clone()
        }

        /// Replies passed to `classify_approval`, in call order.
        pub fn approval_replies(&self) -> Vec<String> {
            self.approval_replies.lock().unwrap().clone()
        }
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ToolAwareLlmProvider for MockLlmProvider {
        async fn complete_with_tools(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<AssistantMessage, LlmError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.fallback.clone())
                .ok_or_else(|| LlmError::InvalidResponse("no queued mock response".to_string()))
        }

        async fn classify_approval(&self, user_reply: &str) -> Result<bool, LlmError> {
            self.approval_replies
                .lock()
                .unwrap()
                .push(user_reply.to_string());
            self.approvals
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::InvalidResponse("no queued mock approval".to_string()))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}
