//! OpenAI chat completions implementation of [`ToolAwareLlmProvider`].

mod translate;


use async_trait::async_trait;
use tracing::debug;

use toolgate_tool_runtime::{
    AssistantMessage, LlmError, Message, ToolAwareLlmProvider, ToolDefinition,
};

use crate::client::OpenAiClient;

const CHAT_PATH: &str = "/v1/chat/completions";

/// Chat transport with function tools and structured approval classification.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl OpenAiProvider {
    pub fn new(
        client: OpenAiClient,
        model: String,
        temperature: f32,
        system_prompt: String,
    ) -> Self {
        Self {
            client,
            model,
            temperature,
            system_prompt,
        }
    }
}

#[async_trait]
impl ToolAwareLlmProvider for OpenAiProvider {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, LlmError> {
        let body = translate::chat_request(
            &self.model,
            self.temperature,
            &self.system_prompt,
            messages,
            tools,
        );
        let resp = self.client.post_json(CHAT_PATH, &body).await?;
        let reply = translate::parse_assistant_message(&resp)?;
        debug!(
            model = %self.model,
            has_content = reply.content.is_some(),
            tool_calls = reply.tool_calls.len(),
            "OpenAI reply"
        );
        Ok(reply)
    }

    async fn classify_approval(&self, user_reply: &str) -> Result<bool, LlmError> {
        let body = translate::approval_request(&self.model, user_reply);
        let resp = self.client.post_json(CHAT_PATH, &body).await?;
        translate::parse_approval(&resp)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
