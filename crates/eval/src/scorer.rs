use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference or context text: a single string or a list of passages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    One(String),
    Many(Vec<String>),
}

/// Everything a scorer sees about one evaluation case.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerArgs {
    pub input: Value,
    pub output: Value,
    pub expected: Option<Value>,
    pub reference: Option<Reference>,
    pub context: Option<Reference>,
}

/// A named scoring function.
///
/// `Ok(None)` means the scorer had no opinion; it is recorded as 0.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, args: &ScorerArgs) -> anyhow::Result<Option<f64>>;
}
