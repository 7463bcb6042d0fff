use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the conversation history.
///
/// Serialized with a `role` tag so the stored shape matches what chat
/// transports exchange: `{"role": "user", "content": "..."}` etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// User's text input
    User { content: String },
    /// Assistant's response (may contain text and/or tool calls)
    Assistant(AssistantMessage),
    /// Result of a tool execution, answering one tool call
    Tool { content: String, tool_call_id: String },
}

/// Content from the assistant that can contain text and tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Final answer text; `None` while the assistant is requesting tools
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant, in the order the model listed them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// Represents an LLM requesting execution of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this invocation (used to match results)
    pub id: String,
    pub function: FunctionCall,
}

/// The function a tool call names, with its decoded JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &Value {
        &self.function.arguments
    }
}

impl AssistantMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }

    /// A final answer carries text; any tool calls alongside it are not acted on.
    pub fn is_final(&self) -> bool {
        self.content.is_some()
    }

    /// Only the first tool call of an assistant message is ever executed.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(content) => Some(content),
            _ => None,
        }
    }

    /// Text content of the message, if it has any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::User { content } | Message::Tool { content, .. } => Some(content),
            Message::Assistant(assistant) => assistant.content.as_deref(),
        }
    }
}

impl From<AssistantMessage> for Message {
    fn from(content: AssistantMessage) -> Self {
        Message::Assistant(content)
    }
}

/// The tool call left unanswered at the end of a history, if any.
///
/// A history at rest only ends in an assistant message with tool calls when
/// the run was suspended on that message's first call.
pub fn unanswered_tool_call(history: &[Message]) -> Option<&ToolCall> {
    history
        .last()
        .and_then(Message::as_assistant)
        .and_then(AssistantMessage::first_tool_call)
}
