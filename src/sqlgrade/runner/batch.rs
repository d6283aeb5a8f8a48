//! Evaluation records and batch artifact
//!
//! One [`EvaluationRecord`] per (question, predicted SQL, gold SQL) example,
//! immutable after construction; an [`EvaluationBatch`] is the ordered run
//! artifact with summary statistics, built once per run and serializable for
//! system-vs-system comparison.

use crate::sqlgrade::eval::clause::ClauseKind;
use crate::sqlgrade::eval::matcher::ClauseMatches;
use crate::sqlgrade::eval::scorer::OverallMetrics;
use crate::sqlgrade::exec::comparator::{ExecutionComparison, ExecutionOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dialect tag carried on batch artifacts.
pub const GENERIC_SQL_DIALECT: &str = "generic-sql";

/// A clause comparison counts as correct when its F1 reaches this threshold.
pub const CLAUSE_CORRECT_F1_THRESHOLD: f64 = 0.8;

/// One evaluation example: the question is carried through for reporting
/// only and never inspected by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalExample {
    /// Natural-language question, if available
    pub question: Option<String>,
    /// SQL produced by the system under evaluation
    pub predicted_sql: String,
    /// Reference SQL taken as ground truth
    pub gold_sql: String,
}

impl EvalExample {
    /// Convenience constructor for a bare (predicted, gold) pair.
    pub fn new(predicted_sql: &str, gold_sql: &str) -> Self {
        Self {
            question: None,
            predicted_sql: predicted_sql.to_string(),
            gold_sql: gold_sql.to_string(),
        }
    }

    /// Attach the natural-language question.
    pub fn with_question(mut self, question: &str) -> Self {
        self.question = Some(question.to_string());
        self
    }
}

/// Full evaluation result for one example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Position within the batch; rows align across runs by this index
    pub index: usize,
    /// Natural-language question, carried through for reporting
    pub question: Option<String>,
    /// Predicted SQL as received
    pub predicted_sql: String,
    /// Gold SQL as received
    pub gold_sql: String,
    /// Per-clause match counts
    pub clause_matches: ClauseMatches,
    /// Micro-averaged overall metrics plus table similarity
    pub overall: OverallMetrics,
    /// Execution comparison outcome and captured error text
    pub execution: ExecutionComparison,
    /// Extraction failure captured for this example, if any
    pub extraction_error: Option<String>,
}

impl EvaluationRecord {
    /// All-zero record for an example whose extraction failed (or was
    /// cancelled); the batch stays complete, the error is visible here.
    pub fn degraded(index: usize, example: &EvalExample, message: String) -> Self {
        Self {
            index,
            question: example.question.clone(),
            predicted_sql: example.predicted_sql.clone(),
            gold_sql: example.gold_sql.clone(),
            clause_matches: ClauseMatches::default(),
            overall: OverallMetrics::default(),
            execution: ExecutionComparison::not_run(),
            extraction_error: Some(message),
        }
    }

    /// True when this record was zeroed by an extraction failure.
    pub fn is_degraded(&self) -> bool {
        self.extraction_error.is_some()
    }

    /// Per-clause F1 as reported: zero for degraded records.
    pub fn clause_f1(&self, kind: ClauseKind) -> f64 {
        if self.is_degraded() {
            0.0
        } else {
            self.clause_matches.get(kind).f1()
        }
    }
}

/// Run-level summary statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total examples evaluated
    pub total: usize,
    /// Examples degraded by extraction failures
    pub malformed: usize,
    /// Mean overall precision across records
    pub mean_precision: f64,
    /// Mean overall recall across records
    pub mean_recall: f64,
    /// Mean overall F1 across records
    pub mean_f1: f64,
    /// Mean table similarity across records
    pub mean_table_similarity: f64,
    /// Per-clause rate of examples with F1 >= the correctness threshold
    pub clause_correct_rates: BTreeMap<String, f64>,
    /// Examples where both queries executed (match or mismatch)
    pub executed: usize,
    /// success-match / total, when execution evaluation ran
    pub execution_match_rate: f64,
    /// predicted-error / total, when execution evaluation ran
    pub execution_error_rate: f64,
}

impl BatchSummary {
    /// Compute summary statistics over a record sequence.
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        if total == 0 {
            return Self::default();
        }

        let malformed = records.iter().filter(|r| r.is_degraded()).count();
        let n = total as f64;

        let mut summary = BatchSummary {
            total,
            malformed,
            mean_precision: records.iter().map(|r| r.overall.precision).sum::<f64>() / n,
            mean_recall: records.iter().map(|r| r.overall.recall).sum::<f64>() / n,
            mean_f1: records.iter().map(|r| r.overall.f1).sum::<f64>() / n,
            mean_table_similarity: records
                .iter()
                .map(|r| r.overall.table_similarity)
                .sum::<f64>()
                / n,
            ..Default::default()
        };

        for kind in ClauseKind::ALL {
            let correct = records
                .iter()
                .filter(|r| r.clause_f1(kind) >= CLAUSE_CORRECT_F1_THRESHOLD)
                .count();
            summary
                .clause_correct_rates
                .insert(kind.name().to_string(), correct as f64 / n);
        }

        summary.executed = records
            .iter()
            .filter(|r| {
                matches!(
                    r.execution.outcome,
                    ExecutionOutcome::SuccessMatch | ExecutionOutcome::SuccessMismatch
                )
            })
            .count();
        summary.execution_match_rate = records
            .iter()
            .filter(|r| r.execution.outcome == ExecutionOutcome::SuccessMatch)
            .count() as f64
            / n;
        summary.execution_error_rate = records
            .iter()
            .filter(|r| r.execution.outcome == ExecutionOutcome::PredictedError)
            .count() as f64
            / n;

        summary
    }
}

/// The complete artifact of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationBatch {
    /// Caller-supplied run identifier
    pub run_id: String,
    /// SQL dialect tag
    pub dialect: String,
    /// Run start (RFC 3339)
    pub started_at: String,
    /// Run end (RFC 3339)
    pub finished_at: String,
    /// Records in input order, one per example
    pub records: Vec<EvaluationRecord>,
    /// Run-level statistics
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_record_is_zeroed() {
        let example = EvalExample::new("not sql", "SELECT a FROM t");
        let record = EvaluationRecord::degraded(3, &example, "no SELECT".to_string());

        assert!(record.is_degraded());
        assert_eq!(record.index, 3);
        assert_eq!(record.overall.f1, 0.0);
        assert_eq!(record.execution.outcome, ExecutionOutcome::NotRun);
        for kind in ClauseKind::ALL {
            assert_eq!(record.clause_f1(kind), 0.0);
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_f1, 0.0);
    }
}
