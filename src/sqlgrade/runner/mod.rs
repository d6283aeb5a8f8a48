//! Batch evaluation runner
//!
//! Drives the evaluation pipeline across a batch of examples. Component
//! scoring is pure and runs on a bounded worker pool; execution comparison
//! touches the shared executor and is serialized through a single permit by
//! default. A batch run always completes: per-example failures degrade that
//! record, never the batch.

pub mod batch;

pub use batch::{
    BatchSummary, EvalExample, EvaluationBatch, EvaluationRecord, CLAUSE_CORRECT_F1_THRESHOLD,
    GENERIC_SQL_DIALECT,
};

use crate::sqlgrade::eval::extractor::extract;
use crate::sqlgrade::eval::matcher::match_queries;
use crate::sqlgrade::eval::normalizer::normalize_query;
use crate::sqlgrade::eval::scorer::{aggregate, table_similarity};
use crate::sqlgrade::exec::comparator::{compare_execution, ExecutionComparison};
use crate::sqlgrade::exec::executor::QueryExecutor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What the runner evaluates per example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Clause decomposition and component metrics only
    ComponentOnly,
    /// Component metrics plus execution-based comparison
    WithExecution,
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Identifier stamped on the batch artifact
    pub run_id: String,
    /// Worker-pool size; defaults to available parallelism
    pub max_concurrency: usize,
    /// Timeout for each executor call
    pub execution_timeout: Duration,
    /// Serialize executor calls through a single permit (set false only for
    /// executors that are safe for concurrent use)
    pub serialize_execution: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            run_id: "eval".to_string(),
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            execution_timeout: Duration::from_secs(30),
            serialize_execution: true,
        }
    }
}

/// Handle for cancelling an in-progress run.
///
/// Cancellation is batch-scoped: examples not yet dispatched degrade to
/// zeroed records, in-flight work finishes or times out naturally, and the
/// partial batch remains valid.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    cancelled: Arc<AtomicBool>,
}

impl RunnerHandle {
    /// Stop dispatching new examples.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives clause extraction, normalization, matching, scoring, and optional
/// execution comparison across a batch of examples.
pub struct EvaluationRunner {
    config: RunnerConfig,
    executor: Option<Arc<dyn QueryExecutor>>,
    cancelled: Arc<AtomicBool>,
}

impl EvaluationRunner {
    /// Create a runner with the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            executor: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Supply the executor capability for execution-based evaluation.
    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Cancellation handle for this runner.
    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            cancelled: self.cancelled.clone(),
        }
    }

    /// Evaluate a batch of examples.
    ///
    /// Always returns one record per input example, in input order.
    pub async fn run(&self, examples: Vec<EvalExample>, mode: EvalMode) -> EvaluationBatch {
        let started_at = chrono::Utc::now();
        let total = examples.len();

        log::info!(
            "Starting evaluation batch '{}': {} examples, mode {:?}, concurrency {}",
            self.config.run_id,
            total,
            mode,
            self.config.max_concurrency
        );

        let examples = Arc::new(examples);
        let pool = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        // Single-slot gate around the shared executor unless the caller
        // declared it safe for concurrent use.
        let exec_gate = self
            .executor
            .as_ref()
            .filter(|_| self.config.serialize_execution)
            .map(|_| Arc::new(Semaphore::new(1)));

        let run_execution = mode == EvalMode::WithExecution && self.executor.is_some();
        if mode == EvalMode::WithExecution && self.executor.is_none() {
            log::warn!("Execution evaluation requested but no executor supplied; skipping");
        }

        let mut join_set = JoinSet::new();
        for index in 0..total {
            let examples = examples.clone();
            let pool = pool.clone();
            let exec_gate = exec_gate.clone();
            let executor = self.executor.clone();
            let cancelled = self.cancelled.clone();
            let timeout = self.config.execution_timeout;

            join_set.spawn(async move {
                let _permit = pool.acquire().await.expect("worker pool semaphore closed");

                let example = &examples[index];
                if cancelled.load(Ordering::SeqCst) {
                    log::debug!("Example {} skipped: batch cancelled", index);
                    return EvaluationRecord::degraded(
                        index,
                        example,
                        "evaluation cancelled before dispatch".to_string(),
                    );
                }

                let mut record = evaluate_components(index, example);

                if run_execution && !record.is_degraded() {
                    if let Some(executor) = executor {
                        let _exec_permit = match &exec_gate {
                            Some(gate) => {
                                Some(gate.acquire().await.expect("executor gate closed"))
                            }
                            None => None,
                        };
                        record.execution = compare_execution(
                            &example.predicted_sql,
                            &example.gold_sql,
                            executor.as_ref(),
                            timeout,
                        )
                        .await;
                    }
                }

                record
            });
        }

        let mut slots: Vec<Option<EvaluationRecord>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(record) => {
                    let index = record.index;
                    slots[index] = Some(record);
                }
                Err(join_error) => {
                    log::error!("Evaluation task failed: {}", join_error);
                }
            }
        }

        // A panicked task leaves a hole; fill it with a degraded record so
        // the batch stays aligned by index.
        let records: Vec<EvaluationRecord> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    EvaluationRecord::degraded(
                        index,
                        &examples[index],
                        "evaluation task failed".to_string(),
                    )
                })
            })
            .collect();

        let summary = BatchSummary::from_records(&records);
        let finished_at = chrono::Utc::now();

        log::info!(
            "Evaluation batch '{}' complete: {} examples, mean F1 {:.3}, {} malformed",
            self.config.run_id,
            summary.total,
            summary.mean_f1,
            summary.malformed
        );

        EvaluationBatch {
            run_id: self.config.run_id.clone(),
            dialect: GENERIC_SQL_DIALECT.to_string(),
            started_at: started_at.to_rfc3339(),
            finished_at: finished_at.to_rfc3339(),
            records,
            summary,
        }
    }
}

/// Component-level evaluation of one example (extraction through scoring).
fn evaluate_components(index: usize, example: &EvalExample) -> EvaluationRecord {
    let predicted = match extract(&example.predicted_sql) {
        Ok(clauses) => clauses,
        Err(e) => {
            log::warn!("Example {}: predicted query degraded: {}", index, e);
            return EvaluationRecord::degraded(index, example, e.to_string());
        }
    };
    let gold = match extract(&example.gold_sql) {
        Ok(clauses) => clauses,
        Err(e) => {
            log::warn!("Example {}: gold query degraded: {}", index, e);
            return EvaluationRecord::degraded(index, example, format!("gold query: {}", e));
        }
    };

    let clause_matches = match_queries(&normalize_query(&predicted), &normalize_query(&gold));
    let overall = aggregate(&clause_matches, table_similarity(&predicted, &gold));

    EvaluationRecord {
        index,
        question: example.question.clone(),
        predicted_sql: example.predicted_sql.clone(),
        gold_sql: example.gold_sql.clone(),
        clause_matches,
        overall,
        execution: ExecutionComparison::not_run(),
        extraction_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_evaluation_self_match() {
        let example = EvalExample::new(
            "SELECT name, age FROM users WHERE age > 30",
            "SELECT name, age FROM users WHERE age > 30",
        );
        let record = evaluate_components(0, &example);
        assert_eq!(record.overall.precision, 1.0);
        assert_eq!(record.overall.recall, 1.0);
        assert_eq!(record.overall.f1, 1.0);
        assert_eq!(record.overall.table_similarity, 1.0);
    }

    #[test]
    fn test_component_evaluation_degrades_on_malformed() {
        let example = EvalExample::new("not sql", "SELECT a FROM t");
        let record = evaluate_components(7, &example);
        assert!(record.is_degraded());
        assert_eq!(record.index, 7);
    }
}
