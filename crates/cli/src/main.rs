mod chat;
mod cli;
mod evaluate;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use toolgate_core::{load_dotenv, AgentConfig, Config};
use toolgate_llm::{create_image_generator, create_provider};
use toolgate_tool_runtime::{AgentCore, GenerateImageTool, PermissionPolicy, ToolRegistry};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let config = Config::from_env();
    config.log_summary();

    match args.command {
        Command::Chat {
            conversation,
            max_turns,
        } => {
            let core = build_core(&config)?;
            let max_turns = max_turns.unwrap_or(config.agent.max_turns);
            chat::run(&config, core, conversation, max_turns).await
        }
        Command::Eval {
            dataset,
            experiment,
            results,
            max_turns,
        } => {
            let core = build_core(&config)?;
            let results = results.unwrap_or_else(|| config.eval.results_path.clone());
            let max_turns = max_turns.unwrap_or(config.agent.max_turns);
            evaluate::run(core, &dataset, &experiment, results, max_turns).await
        }
    }
}

/// Transport, `generate_image` tool and permission policy from config.
fn build_core(config: &Config) -> Result<Arc<AgentCore>> {
    let provider = create_provider(&config.llm).context("failed to create LLM provider")?;
    let images = create_image_generator(&config.llm).context("failed to create image generator")?;

    let mut registry = ToolRegistry::new();
    registry
        .register(GenerateImageTool::new(images))
        .context("failed to register generate_image tool")?;

    let policy = permission_policy(&config.agent);
    Ok(Arc::new(AgentCore::new(provider, Arc::new(registry), policy)))
}

/// `SENSITIVE_TOOLS` extends the default policy; `generate_image` is always gated.
fn permission_policy(agent: &AgentConfig) -> PermissionPolicy {
    PermissionPolicy::default().with_additional(agent.sensitive_tools.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_tools_do_not_ungate_image_generation() {
        let agent = AgentConfig {
            max_turns: 10,
            history_dir: "data/conversations".into(),
            sensitive_tools: vec!["send_email".to_string()],
        };
        let policy = permission_policy(&agent);
        assert!(policy.requires_confirmation("generate_image"));
        assert!(policy.requires_confirmation("send_email"));
        assert!(!policy.requires_confirmation("calc"));
    }
}
