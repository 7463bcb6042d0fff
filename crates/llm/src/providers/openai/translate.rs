//! Translation between provider-agnostic conversation types and the OpenAI chat format.

use serde_json::{json, Value};

use toolgate_tool_runtime::{AssistantMessage, LlmError, Message, ToolCall, ToolDefinition};

const APPROVAL_INSTRUCTIONS: &str =
    "Determine if the user approved the image generation. If you are not sure, then it is not approved.";

/// Translate a [`ToolDefinition`] into the OpenAI function tool format.
pub(super) fn tool_definition_to_openai(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        },
    })
}

/// Translate a [`Message`] into an OpenAI chat message object.
pub(super) fn message_to_openai(msg: &Message) -> Value {
    match msg {
        Message::User { content } => json!({
            "role": "user",
            "content": content,
        }),
        Message::Assistant(assistant) => {
            let mut obj = json!({
                "role": "assistant",
                "content": assistant.content,
            });
            if !assistant.tool_calls.is_empty() {
                let calls: Vec<Value> = assistant
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name(),
                                // The API carries arguments as a JSON-encoded string.
                                "arguments": tc.arguments().to_string(),
                            },
                        })
                    })
                    .collect();
                obj["tool_calls"] = Value::Array(calls);
            }
            obj
        }
        Message::Tool {
            content,
            tool_call_id,
        } => json!({
            "role": "tool",
            "content": content,
            "tool_call_id": tool_call_id,
        }),
    }
}

/// Full chat completion request: system prompt first, then the history.
pub(super) fn chat_request(
    model: &str,
    temperature: f32,
    system_prompt: &str,
    messages: &[Message],
    tools: &[ToolDefinition],
) -> Value {
    let mut api_messages = vec![json!({"role": "system", "content": system_prompt})];
    api_messages.extend(messages.iter().map(message_to_openai));

    let mut body = json!({
        "model": model,
        "temperature": temperature,
        "messages": api_messages,
    });
    if !tools.is_empty() {
        body["tools"] = tools.iter().map(tool_definition_to_openai).collect();
        body["parallel_tool_calls"] = json!(false);
    }
    body
}

/// Decode `choices[0].message` into an [`AssistantMessage`].
pub(super) fn parse_assistant_message(resp: &Value) -> Result<AssistantMessage, LlmError> {
    let message = resp
        .pointer("/choices/0/message")
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message".into()))?;

    // Some models send "" alongside tool calls; treat it as no content.
    let content = message["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message["tool_calls"].as_array() {
        for call in calls {
            tool_calls.push(parse_tool_call(call)?);
        }
    }

    Ok(AssistantMessage {
        content,
        tool_calls,
    })
}

fn parse_tool_call(call: &Value) -> Result<ToolCall, LlmError> {
    let id = call["id"]
        .as_str()
        .ok_or_else(|| LlmError::InvalidResponse("tool call without id".into()))?;
    let name = call["function"]["name"]
        .as_str()
        .ok_or_else(|| LlmError::InvalidResponse(format!("tool call {id} without function name")))?;
    let arguments = match &call["function"]["arguments"] {
        Value::String(raw) if raw.trim().is_empty() => json!({}),
        Value::String(raw) => serde_json::from_str(raw).map_err(|e| {
            LlmError::InvalidResponse(format!("tool call {id} has invalid arguments: {e}"))
        })?,
        Value::Null => json!({}),
        other => other.clone(),
    };
    Ok(ToolCall::new(id, name, arguments))
}

/// A tool-less request asking for a strict `{"approved": bool}` verdict.
pub(super) fn approval_request(model: &str, user_reply: &str) -> Value {
    json!({
        "model": model,
        "temperature": 0.1,
        "messages": [
            {"role": "system", "content": APPROVAL_INSTRUCTIONS},
            {"role": "user", "content": user_reply},
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "approval",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "approved": {
                            "type": "boolean",
                            "description": "did the user approve the action or not",
                        },
                    },
                    "required": ["approved"],
                    "additionalProperties": false,
                },
            },
        },
    })
}

pub(super) fn parse_approval(resp: &Value) -> Result<bool, LlmError> {
    let content = resp
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".into()))?;
    let verdict: Value = serde_json::from_str(content)
        .map_err(|e| LlmError::InvalidResponse(format!("approval verdict is not JSON: {e}")))?;
    verdict["approved"]
        .as_bool()
        .ok_or_else(|| LlmError::InvalidResponse("approval verdict lacks 'approved'".into()))
}
