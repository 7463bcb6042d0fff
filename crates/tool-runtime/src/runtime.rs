use crate::agent::{AgentCore, AgentError, NextStep, DEFAULT_MAX_TURNS};
use crate::approval::{ApprovalDecision, ApprovalGate};
use crate::history::{ConversationId, HistoryStore};
use crate::message::{unanswered_tool_call, Message, ToolCall};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// How an invocation of the conversation loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStatus {
    /// The model produced a final answer.
    Completed,
    /// A sensitive tool call is waiting for the user's decision.
    Suspended(ToolCall),
    /// The user's input answered a pending approval; no model turn was run.
    ApprovalResolved(ApprovalDecision),
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    /// Full conversation history after the invocation.
    pub history: Vec<Message>,
}

impl TurnOutcome {
    pub fn is_suspended(&self) -> bool {
        matches!(self.status, TurnStatus::Suspended(_))
    }

    /// The message that ended the invocation.
    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }
}

/// The interactive loop that orchestrates User ↔ LLM ↔ Tool execution.
///
/// Flow: User → LLM → ToolCall → Execute → Result → LLM → ... → Final Text,
/// pausing whenever the LLM asks for a tool the policy marks as sensitive.
pub struct ConversationOrchestrator {
    core: Arc<AgentCore>,
    history: Arc<dyn HistoryStore>,
    max_turns: usize,
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl ConversationOrchestrator {
    pub fn new(core: Arc<AgentCore>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            core,
            history,
            max_turns: DEFAULT_MAX_TURNS,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Serialize read-modify-append per conversation; other ids are unaffected.
    async fn lock_conversation(&self, conversation: &ConversationId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .await
            .entry(conversation.clone())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Release `guard` and forget the conversation's lock if nobody else holds it.
    async fn unlock_conversation(&self, conversation: &ConversationId, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.locks.lock().await;
        if locks
            .get(conversation)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(conversation);
        }
    }

    /// Run one user input through the loop.
    ///
    /// If the stored history ends on a sensitive tool call awaiting approval,
    /// `user_message` is treated as the answer to that question instead of
    /// being appended as conversation content. A non-sensitive call left
    /// unanswered by a failed dispatch is retried before the input is stored.
    pub async fn run(
        &self,
        conversation: &ConversationId,
        user_message: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let guard = self.lock_conversation(conversation).await;
        let result = self.run_locked(conversation, user_message).await;
        self.unlock_conversation(conversation, guard).await;
        result
    }

    async fn run_locked(
        &self,
        conversation: &ConversationId,
        user_message: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let history = self.history.load(conversation).await?;
        if let Some(pending) = unanswered_tool_call(&history).cloned() {
            if self.core.policy().requires_confirmation(pending.name()) {
                debug!(
                    conversation = %conversation,
                    tool = pending.name(),
                    "Resolving pending approval"
                );
                let (decision, message) = ApprovalGate::new(&self.core)
                    .resolve(&pending, user_message)
                    .await?;
                self.history.append(conversation, &[message]).await?;
                return self
                    .outcome(conversation, TurnStatus::ApprovalResolved(decision))
                    .await;
            }

            info!(
                conversation = %conversation,
                tool = pending.name(),
                "Retrying unanswered tool call"
            );
            let asked = last_user_content(&history).unwrap_or(user_message);
            let result = self.core.execute(&pending, asked).await?;
            self.history.append(conversation, &[result]).await?;
        }

        self.history
            .append(conversation, &[Message::user(user_message)])
            .await?;

        for turn in 0..self.max_turns {
            debug!(conversation = %conversation, turn, "Starting model turn");
            let history = self.history.load(conversation).await?;
            let reply = self.core.model_turn(&history).await?;
            let step = self.core.next_step(&reply)?;
            self.history.append(conversation, &[reply.into()]).await?;

            match step {
                NextStep::Finish => {
                    info!(conversation = %conversation, turn, "Conversation turn complete");
                    return self.outcome(conversation, TurnStatus::Completed).await;
                }
                NextStep::AwaitApproval(call) => {
                    info!(
                        conversation = %conversation,
                        tool = call.name(),
                        "Tool call needs user approval"
                    );
                    return self.outcome(conversation, TurnStatus::Suspended(call)).await;
                }
                NextStep::Execute(call) => {
                    info!(conversation = %conversation, tool = call.name(), "Executing tool call");
                    let result = self.core.execute(&call, user_message).await?;
                    self.history.append(conversation, &[result]).await?;
                }
            }
        }

        Err(AgentError::TurnLimitExceeded(self.max_turns))
    }

    async fn outcome(
        &self,
        conversation: &ConversationId,
        status: TurnStatus,
    ) -> Result<TurnOutcome, AgentError> {
        let history = self.history.load(conversation).await?;
        Ok(TurnOutcome { status, history })
    }
}

fn last_user_content(history: &[Message]) -> Option<&str> {
    history.iter().rev().find_map(|message| match message {
        Message::User { content } => Some(content.as_str()),
        _ => None,
    })
}
