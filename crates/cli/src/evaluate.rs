use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use toolgate_eval::{load_cases, run_eval, EvalBatch, EvalTask, ExperimentStore, ToolCallMatch};
use toolgate_tool_runtime::{AgentCore, EvalOrchestrator};

/// Run every dataset case through the evaluation loop and score the final message.
pub async fn run(
    core: Arc<AgentCore>,
    dataset: &Path,
    experiment: &str,
    results: PathBuf,
    max_turns: usize,
) -> Result<()> {
    let cases = load_cases(dataset).await?;
    info!(dataset = %dataset.display(), cases = cases.len(), experiment, "Starting evaluation");

    let orchestrator = Arc::new(EvalOrchestrator::new(core).with_max_turns(max_turns));
    let task: Arc<dyn EvalTask> = Arc::new(move |input: Value| {
        let orchestrator = orchestrator.clone();
        async move {
            let prompt = match input {
                Value::String(s) => s,
                other => other.to_string(),
            };
            let messages = orchestrator.run(&prompt).await?;
            let last = messages.last().context("evaluation produced no messages")?;
            Ok::<_, anyhow::Error>(serde_json::to_value(last)?)
        }
    });

    let store = ExperimentStore::new(results);
    run_eval(
        &store,
        experiment,
        EvalBatch {
            task,
            data: cases,
            scorers: vec![Arc::new(ToolCallMatch)],
        },
    )
    .await
    .with_context(|| format!("evaluation '{}' failed", experiment))?;
    Ok(())
}
