//! End-to-end conversation flows against the on-disk history store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use toolgate_tool_runtime::provider::mock::MockLlmProvider;
use toolgate_tool_runtime::tool::EchoTool;
use toolgate_tool_runtime::{
    AgentCore, ApprovalDecision, ConversationId, ConversationOrchestrator, GenerateImageTool,
    HistoryStore, ImageGenerator, JsonFileHistory, Message, PermissionPolicy, ToolRegistry,
    TurnStatus, DENIAL_MESSAGE,
};

struct StubImages;

#[async_trait]
impl ImageGenerator for StubImages {
    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(Some(format!("https://images.test/{}.png", prompt.replace(' ', "-"))))
    }
}

fn orchestrator(
    provider: Arc<MockLlmProvider>,
    history: Arc<JsonFileHistory>,
) -> ConversationOrchestrator {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool).unwrap();
    registry
        .register(GenerateImageTool::new(Arc::new(StubImages)))
        .unwrap();
    let core = AgentCore::new(provider, Arc::new(registry), PermissionPolicy::default());
    ConversationOrchestrator::new(Arc::new(core), history)
}

#[tokio::test]
async fn approval_survives_restart_and_runs_image_tool() {
    let dir = tempfile::tempdir().unwrap();
    let id = ConversationId::new("cat-session").unwrap();

    let provider = Arc::new(MockLlmProvider::new());
    provider.queue_tool_call("call_img", "generate_image", json!({"prompt": "a cat"}));
    let first = orchestrator(provider, Arc::new(JsonFileHistory::new(dir.path())))
        .run(&id, "Draw me a cat")
        .await
        .unwrap();
    assert!(first.is_suspended());

    // A fresh process picks the pending call up from disk.
    let provider = Arc::new(MockLlmProvider::new());
    provider.queue_approval(true);
    let history = Arc::new(JsonFileHistory::new(dir.path()));
    let outcome = orchestrator(provider, history.clone())
        .run(&id, "sure, go ahead")
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        TurnStatus::ApprovalResolved(ApprovalDecision::Approved)
    );
    let stored = history.load(&id).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(
        stored[2],
        Message::tool("call_img", "https://images.test/a-cat.png")
    );
}

#[tokio::test]
async fn denial_never_invokes_the_image_service() {
    let dir = tempfile::tempdir().unwrap();
    let id = ConversationId::new("deny").unwrap();
    let provider = Arc::new(MockLlmProvider::new());
    let orch = orchestrator(provider.clone(), Arc::new(JsonFileHistory::new(dir.path())));

    provider.queue_tool_call("call_img", "generate_image", json!({"prompt": "a dog"}));
    orch.run(&id, "Draw a dog").await.unwrap();
    provider.queue_approval(false);
    let outcome = orch.run(&id, "actually no").await.unwrap();

    let tool_messages: Vec<_> = outcome
        .history
        .iter()
        .filter(|m| matches!(m, Message::Tool { .. }))
        .collect();
    assert_eq!(tool_messages.len(), 1);
    assert_eq!(tool_messages[0].content(), Some(DENIAL_MESSAGE));
}

#[tokio::test]
async fn separate_conversations_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockLlmProvider::always(
        toolgate_tool_runtime::AssistantMessage::text("ok"),
    ));
    let orch = Arc::new(orchestrator(
        provider,
        Arc::new(JsonFileHistory::new(dir.path())),
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let orch = orch.clone();
        handles.push(tokio::spawn(async move {
            let id = ConversationId::new(format!("conv-{i}")).unwrap();
            orch.run(&id, "hello").await
        }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.status, TurnStatus::Completed);
        assert_eq!(outcome.history.len(), 2);
    }
}

#[tokio::test]
async fn same_conversation_is_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockLlmProvider::always(
        toolgate_tool_runtime::AssistantMessage::text("ok"),
    ));
    let history = Arc::new(JsonFileHistory::new(dir.path()));
    let orch = Arc::new(orchestrator(provider, history.clone()));
    let id = ConversationId::new("shared").unwrap();

    let a = {
        let (orch, id) = (orch.clone(), id.clone());
        tokio::spawn(async move { orch.run(&id, "first").await })
    };
    let b = {
        let (orch, id) = (orch.clone(), id.clone());
        tokio::spawn(async move { orch.run(&id, "second").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // Each user message is directly followed by its own answer.
    let stored = history.load(&id).await.unwrap();
    assert_eq!(stored.len(), 4);
    assert!(matches!(stored[0], Message::User { .. }));
    assert!(matches!(stored[1], Message::Assistant(_)));
    assert!(matches!(stored[2], Message::User { .. }));
    assert!(matches!(stored[3], Message::Assistant(_)));
}
