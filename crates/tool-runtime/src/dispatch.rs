//! Routes a tool call to its registered handler.

use std::sync::Arc;
use tracing::debug;

use crate::message::ToolCall;
use crate::registry::ToolRegistry;
use crate::tool::{ToolContext, ToolDefinition, ToolError};

/// Resolves tool calls against a registry and invokes them.
///
/// Pure routing: the only side effects are the ones the invoked tool performs.
/// Failures are returned as-is, never retried.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Definitions advertised to the model transport.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Execute `call` with its arguments, passing the turn's user message as context.
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        user_message: &str,
    ) -> Result<String, DispatchError> {
        let tool = self
            .registry
            .get(call.name())
            .ok_or_else(|| DispatchError::UnknownTool(call.name().to_string()))?;

        debug!(tool = call.name(), call_id = %call.id, "Dispatching tool call");
        let context = ToolContext {
            user_message: user_message.to_string(),
        };
        tool.execute(call.arguments().clone(), &context)
            .await
            .map_err(|source| DispatchError::ToolExecution {
                tool: call.name().to_string(),
                source,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: ToolError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::EchoTool;
    use serde_json::json;

    fn dispatcher() -> ToolDispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        ToolDispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_dispatch_known_tool() {
        let call = ToolCall::new("call_1", "echo", json!({"message": "ping"}));
        let out = dispatcher().dispatch(&call, "say ping").await.unwrap();
        assert_eq!(out, "ping");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let call = ToolCall::new("call_1", "missing", json!({}));
        let err = dispatcher().dispatch(&call, "").await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownTool(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_dispatch_tool_failure_is_surfaced() {
        let call = ToolCall::new("call_1", "echo", json!({"wrong": true}));
        let err = dispatcher().dispatch(&call, "").await.unwrap_err();
        match err {
            DispatchError::ToolExecution { tool, source } => {
                assert_eq!(tool, "echo");
                assert!(matches!(source, ToolError::InvalidInput(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
