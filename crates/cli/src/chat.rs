use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use toolgate_core::Config;
use toolgate_tool_runtime::message::unanswered_tool_call;
use toolgate_tool_runtime::{
    AgentCore, ApprovalDecision, ConversationId, ConversationOrchestrator, HistoryStore,
    JsonFileHistory, Message, TurnOutcome, TurnStatus,
};

use crate::terminal::Terminal;

/// Interactive REPL over one persisted conversation.
pub async fn run(
    config: &Config,
    core: Arc<AgentCore>,
    conversation: Option<String>,
    max_turns: usize,
) -> Result<()> {
    let terminal = Terminal::new();
    let id = match conversation {
        Some(raw) => ConversationId::new(raw).context("invalid conversation id")?,
        None => ConversationId::generate(),
    };

    let history = Arc::new(JsonFileHistory::new(&config.agent.history_dir));
    let existing = history
        .load(&id)
        .await
        .with_context(|| format!("failed to load conversation '{}'", id))?;

    terminal.print_banner(core.provider().provider_name(), &config.llm.model, id.as_str())?;
    if !existing.is_empty() {
        info!(conversation = %id, messages = existing.len(), "Resuming conversation");
        terminal.print_info(&format!("Resumed conversation ({} messages)", existing.len()))?;
        if let Some(pending) = unanswered_tool_call(&existing)
            .filter(|call| core.policy().requires_confirmation(call.name()))
        {
            terminal.print_approval_request(pending)?;
        }
    }

    let orchestrator = ConversationOrchestrator::new(core, history).with_max_turns(max_turns);

    while let Some(input) = terminal.read_input()? {
        if input.is_empty() {
            continue;
        }
        match orchestrator.run(&id, &input).await {
            Ok(outcome) => show_outcome(&terminal, &outcome)?,
            Err(e) => {
                error!(conversation = %id, error = %e, "Turn failed");
                terminal.print_error(&e.to_string())?;
            }
        }
    }

    terminal.print_info(&format!("Conversation saved as {}", id))?;
    Ok(())
}

fn show_outcome(terminal: &Terminal, outcome: &TurnOutcome) -> Result<()> {
    match &outcome.status {
        TurnStatus::Completed => {
            if let Some(text) = outcome.last_message().and_then(Message::content) {
                terminal.print_assistant(text)?;
            }
        }
        TurnStatus::Suspended(call) => terminal.print_approval_request(call)?,
        TurnStatus::ApprovalResolved(decision) => {
            let content = outcome
                .last_message()
                .and_then(Message::content)
                .unwrap_or_default();
            match decision {
                ApprovalDecision::Approved => {
                    let tool = approved_tool_name(&outcome.history).unwrap_or("tool");
                    terminal.print_tool_result(tool, content)?;
                }
                ApprovalDecision::Denied => terminal.print_info(content)?,
            }
        }
    }
    Ok(())
}

/// Name of the tool call answered by the last message.
fn approved_tool_name(history: &[Message]) -> Option<&str> {
    let (last, earlier) = history.split_last()?;
    let Message::Tool { tool_call_id, .. } = last else {
        return None;
    };
    earlier
        .iter()
        .rev()
        .filter_map(Message::as_assistant)
        .flat_map(|m| m.tool_calls.iter())
        .find(|call| &call.id == tool_call_id)
        .map(|call| call.name())
}
