//! Built-in scorers.

use async_trait::async_trait;

use crate::scorer::{Scorer, ScorerArgs};

/// 1 when the output is an assistant message with exactly one tool call
/// whose function name equals the first expected tool call's name.
pub struct ToolCallMatch;

#[async_trait]
impl Scorer for ToolCallMatch {
    fn name(&self) -> &str {
        "ToolCallMatch"
    }

    async fn score(&self, args: &ScorerArgs) -> anyhow::Result<Option<f64>> {
        let output = &args.output;
        let single_call = output["role"] == "assistant"
            && output["tool_calls"]
                .as_array()
                .is_some_and(|calls| calls.len() == 1);
        let actual = output.pointer("/tool_calls/0/function/name");
        let expected = args
            .expected
            .as_ref()
            .and_then(|e| e.pointer("/tool_calls/0/function/name"));

        Ok(Some(if single_call && actual == expected { 1.0 } else { 0.0 }))
    }
}

/// 1 when the output equals the expected value exactly.
pub struct ExactMatch;

#[async_trait]
impl Scorer for ExactMatch {
    fn name(&self) -> &str {
        "ExactMatch"
    }

    async fn score(&self, args: &ScorerArgs) -> anyhow::Result<Option<f64>> {
        let Some(expected) = &args.expected else {
            return Ok(None);
        };
        Ok(Some(if &args.output == expected { 1.0 } else { 0.0 }))
    }
}
