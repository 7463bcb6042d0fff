//! Scoring and experiment tracking for batches of evaluation cases.
//!
//! [`run_eval`] runs a task over every case, scores each output, appends the
//! resulting set to a named experiment in a JSON document and reports the
//! score change against the experiment's previous set.

pub mod dataset;
pub mod model;
pub mod report;
pub mod runner;
pub mod scorer;
pub mod scorers;
pub mod store;
pub mod task;

pub use dataset::{load_cases, DatasetError, EvalCase};
pub use model::{aggregate_score, Experiment, ExperimentSet, ResultsDocument, Run, Score};
pub use report::EvalReport;
pub use runner::{run_eval, EvalBatch, EvalError, EvalOutcome};
pub use scorer::{Reference, Scorer, ScorerArgs};
pub use scorers::{ExactMatch, ToolCallMatch};
pub use store::{ExperimentStore, StoreError, StoreWriter};
pub use task::{EvalTask, TaskOutput};
