use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dataset::EvalCase;
use crate::model::{aggregate_score, ExperimentSet, Run, Score};
use crate::report::EvalReport;
use crate::scorer::{Scorer, ScorerArgs};
use crate::store::{ExperimentStore, StoreError};
use crate::task::{EvalTask, TaskOutput};

/// What to evaluate: a task, its cases and the scorers applied to each output.
pub struct EvalBatch {
    pub task: Arc<dyn EvalTask>,
    pub data: Vec<EvalCase>,
    pub scorers: Vec<Arc<dyn Scorer>>,
}

#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub runs: Vec<Run>,
    pub report: EvalReport,
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Task failed on case {index}: {source}")]
    Task {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("Scorer {scorer} failed on case {index}: {source}")]
    Scorer {
        scorer: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

/// Score every case concurrently, append the set to `experiment` and print
/// the score change on stdout.
///
/// Any task or scorer failure fails the whole call and nothing is stored.
pub async fn run_eval(
    store: &ExperimentStore,
    experiment: &str,
    batch: EvalBatch,
) -> Result<EvalOutcome, EvalError> {
    let EvalBatch {
        task,
        data,
        scorers,
    } = batch;

    let runs = try_join_all(
        data.into_iter()
            .enumerate()
            .map(|(index, case)| run_case(index, case, task.as_ref(), &scorers)),
    )
    .await?;

    let writer = store.writer().await;
    let previous = writer.load_experiment(experiment).await?;
    let report = EvalReport {
        experiment: experiment.to_string(),
        previous_score: previous.as_ref().and_then(|e| e.latest_score()).unwrap_or(0.0),
        current_score: aggregate_score(&runs),
        is_new: previous.is_none(),
    };
    writer
        .append_set(experiment, ExperimentSet::new(runs.clone(), Utc::now()))
        .await?;
    drop(writer);

    info!(
        experiment,
        runs = runs.len(),
        previous = report.previous_score,
        current = report.current_score,
        "Evaluation set recorded"
    );
    report.print()?;

    Ok(EvalOutcome { runs, report })
}

async fn run_case(
    index: usize,
    case: EvalCase,
    task: &dyn EvalTask,
    scorers: &[Arc<dyn Scorer>],
) -> Result<Run, EvalError> {
    let raw = task
        .run(&case.input)
        .await
        .map_err(|source| EvalError::Task { index, source })?;
    let output = TaskOutput::normalize(raw).map_err(|e| EvalError::Task {
        index,
        source: e.into(),
    })?;

    let args = ScorerArgs {
        input: case.input,
        output: output.response,
        expected: case.expected,
        reference: case.reference,
        context: output.context,
    };

    let scores = try_join_all(scorers.iter().map(|scorer| {
        let args = &args;
        async move {
            let value = scorer
                .score(args)
                .await
                .map_err(|source| EvalError::Scorer {
                    scorer: scorer.name().to_string(),
                    index,
                    source,
                })?;
            let score = value.unwrap_or(0.0);
            // serde_json stores NaN and infinities as null, which cannot be read back.
            if !score.is_finite() {
                return Err(EvalError::Scorer {
                    scorer: scorer.name().to_string(),
                    index,
                    source: anyhow::anyhow!("non-finite score {score}"),
                });
            }
            Ok::<_, EvalError>(Score {
                name: scorer.name().to_string(),
                score,
            })
        }
    }))
    .await?;
    debug!(index, scores = ?scores, "Case scored");

    let ScorerArgs {
        input,
        output,
        expected,
        ..
    } = args;
    Ok(Run {
        input,
        output,
        expected,
        scores,
        created_at: Utc::now(),
    })
}
