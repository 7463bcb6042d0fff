//! Persisted experiment records.
//!
//! Field names are camelCase on disk (`createdAt`) so result files stay
//! readable by other tooling that consumes the same document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub score: f64,
}

/// The scored result of one evaluation case within one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub input: Value,
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    pub scores: Vec<Score>,
    pub created_at: DateTime<Utc>,
}

impl Run {
    /// Mean of this run's scores; 0 when it has none.
    pub fn average_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|s| s.score).sum::<f64>() / self.scores.len() as f64
    }
}

/// Mean of per-run averages. Runs without scores count as 0 and still
/// count toward the divisor; an empty slice aggregates to 0.
pub fn aggregate_score(runs: &[Run]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(Run::average_score).sum::<f64>() / runs.len() as f64
}

/// One evaluation batch. `score` is fixed when the set is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentSet {
    pub runs: Vec<Run>,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl ExperimentSet {
    pub fn new(runs: Vec<Run>, created_at: DateTime<Utc>) -> Self {
        let score = aggregate_score(&runs);
        Self {
            runs,
            score,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    pub sets: Vec<ExperimentSet>,
}

impl Experiment {
    /// Aggregate of the most recent set, if any.
    pub fn latest_score(&self) -> Option<f64> {
        self.sets.last().map(|set| set.score)
    }
}

/// The whole results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

impl ResultsDocument {
    pub fn experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.name == name)
    }

    /// Append `set` to `name`, creating the experiment when absent.
    pub fn append_set(&mut self, name: &str, set: ExperimentSet) {
        match self.experiments.iter_mut().find(|e| e.name == name) {
            Some(experiment) => experiment.sets.push(set),
            None => self.experiments.push(Experiment {
                name: name.to_string(),
                sets: vec![set],
            }),
        }
    }
}
