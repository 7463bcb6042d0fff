pub mod agent;
pub mod approval;
pub mod dispatch;
pub mod evaluation;
pub mod history;
pub mod message;
pub mod permission;
pub mod provider;
pub mod registry;
pub mod runtime;
pub mod tool;
pub mod tools;

pub use agent::{AgentCore, AgentError, NextStep};
pub use approval::{ApprovalDecision, ApprovalGate, DENIAL_MESSAGE};
pub use dispatch::{DispatchError, ToolDispatcher};
pub use evaluation::EvalOrchestrator;
pub use history::{ConversationId, HistoryError, HistoryStore, InMemoryHistory, JsonFileHistory};
pub use message::{AssistantMessage, FunctionCall, Message, ToolCall};
pub use permission::{PermissionLevel, PermissionPolicy};
pub use provider::{LlmError, ToolAwareLlmProvider};
pub use registry::ToolRegistry;
pub use runtime::{ConversationOrchestrator, TurnOutcome, TurnStatus};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolError};
pub use tools::{GenerateImageTool, ImageGenerator};
