use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tool-calling assistant that asks before running sensitive tools.
#[derive(Parser, Debug)]
#[command(name = "toolgate", about = "Tool-calling assistant with a human approval gate")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Talk to the assistant interactively
    Chat {
        /// Resume (or name) a conversation; a fresh id is generated if omitted
        #[arg(long)]
        conversation: Option<String>,

        /// Maximum model calls per message (overrides AGENT_MAX_TURNS)
        #[arg(long)]
        max_turns: Option<usize>,
    },
    /// Score a dataset and record the result under an experiment name
    Eval {
        /// JSON array of {input, expected?, reference?} cases
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long)]
        experiment: String,

        /// Results document (overrides EVAL_RESULTS_PATH)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Maximum model calls per case (overrides AGENT_MAX_TURNS)
        #[arg(long)]
        max_turns: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat() {
        let args = CliArgs::try_parse_from(["toolgate", "chat", "--conversation", "abc"]).unwrap();
        assert_eq!(
            args.command,
            Command::Chat {
                conversation: Some("abc".into()),
                max_turns: None
            }
        );
    }

    #[test]
    fn test_parse_eval() {
        let args = CliArgs::try_parse_from([
            "toolgate",
            "eval",
            "--dataset",
            "cases.json",
            "--experiment",
            "image-routing",
        ])
        .unwrap();
        match args.command {
            Command::Eval {
                dataset,
                experiment,
                results,
                ..
            } => {
                assert_eq!(dataset, PathBuf::from("cases.json"));
                assert_eq!(experiment, "image-routing");
                assert!(results.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_eval_requires_experiment() {
        assert!(CliArgs::try_parse_from(["toolgate", "eval", "--dataset", "x.json"]).is_err());
    }
}
