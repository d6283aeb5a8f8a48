//! Execution-based result comparison
//!
//! Executes predicted and gold queries through the injected executor and
//! compares the result tables for data equivalence: row order and column
//! order are ignored unless the gold query requests a stable ordering, and
//! numeric cells absorb small representation differences. All failures are
//! captured into the returned outcome; this module never raises.

use super::executor::{ExecutionError, QueryExecutor};
use super::types::{CellValue, Table};
use crate::sqlgrade::eval::clause::ClauseKind;
use crate::sqlgrade::eval::extractor::extract;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scale factor for numeric cell comparison: values are rounded to nine
/// decimal places before keying.
const NUMERIC_EPSILON_SCALE: f64 = 1e9;

/// Classification of an execution-based comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionOutcome {
    /// Execution-based evaluation was not requested or not possible
    NotRun,
    /// Both queries ran and produced equivalent result sets
    SuccessMatch,
    /// Both queries ran but produced different result sets
    SuccessMismatch,
    /// The predicted query failed to execute
    PredictedError,
    /// Only the gold query failed to execute
    GoldError,
}

impl ExecutionOutcome {
    /// Stable artifact name.
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionOutcome::NotRun => "not-run",
            ExecutionOutcome::SuccessMatch => "success-match",
            ExecutionOutcome::SuccessMismatch => "success-mismatch",
            ExecutionOutcome::PredictedError => "predicted-error",
            ExecutionOutcome::GoldError => "gold-error",
        }
    }
}

impl std::fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of comparing predicted vs. gold execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionComparison {
    /// Outcome classification
    pub outcome: ExecutionOutcome,
    /// Captured predicted-query error text
    pub predicted_error: Option<String>,
    /// Captured gold-query error text
    pub gold_error: Option<String>,
    /// Predicted result row count, when execution succeeded
    pub predicted_rows: Option<usize>,
    /// Gold result row count, when execution succeeded
    pub gold_rows: Option<usize>,
}

impl ExecutionComparison {
    /// The not-run placeholder used when execution evaluation is disabled.
    pub fn not_run() -> Self {
        Self {
            outcome: ExecutionOutcome::NotRun,
            predicted_error: None,
            gold_error: None,
            predicted_rows: None,
            gold_rows: None,
        }
    }
}

/// Execute both queries and compare their result tables.
///
/// The predicted query failing classifies the outcome as `PredictedError`;
/// the gold query is still executed so its error (if any) lands in the
/// diagnostics. Each call runs under `timeout`.
pub async fn compare_execution(
    predicted_sql: &str,
    gold_sql: &str,
    executor: &dyn QueryExecutor,
    timeout: Duration,
) -> ExecutionComparison {
    let predicted = run_with_timeout(executor, predicted_sql, timeout).await;
    let gold = run_with_timeout(executor, gold_sql, timeout).await;

    match (predicted, gold) {
        (Err(pred_err), gold) => {
            log::debug!("predicted query failed: {}", pred_err);
            ExecutionComparison {
                outcome: ExecutionOutcome::PredictedError,
                predicted_error: Some(pred_err.to_string()),
                gold_error: gold.err().map(|e| e.to_string()),
                predicted_rows: None,
                gold_rows: None,
            }
        }
        (Ok(pred_table), Err(gold_err)) => {
            log::debug!("gold query failed: {}", gold_err);
            ExecutionComparison {
                outcome: ExecutionOutcome::GoldError,
                predicted_error: None,
                gold_error: Some(gold_err.to_string()),
                predicted_rows: Some(pred_table.row_count()),
                gold_rows: None,
            }
        }
        (Ok(pred_table), Ok(gold_table)) => {
            let ordered = gold_requests_ordering(gold_sql);
            let equivalent = tables_equivalent(&pred_table, &gold_table, ordered);
            ExecutionComparison {
                outcome: if equivalent {
                    ExecutionOutcome::SuccessMatch
                } else {
                    ExecutionOutcome::SuccessMismatch
                },
                predicted_error: None,
                gold_error: None,
                predicted_rows: Some(pred_table.row_count()),
                gold_rows: Some(gold_table.row_count()),
            }
        }
    }
}

async fn run_with_timeout(
    executor: &dyn QueryExecutor,
    sql: &str,
    timeout: Duration,
) -> Result<Table, ExecutionError> {
    match tokio::time::timeout(timeout, executor.execute(sql)).await {
        Ok(result) => result,
        Err(_) => Err(ExecutionError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

/// Whether the gold query asked for a stable row ordering.
fn gold_requests_ordering(gold_sql: &str) -> bool {
    extract(gold_sql)
        .map(|clauses| !clauses.get(ClauseKind::OrderBy).is_empty())
        .unwrap_or(false)
}

/// Data equivalence between two result tables.
///
/// Each row reduces to a sorted multiset of canonical cell keys, making the
/// comparison column-order-insensitive. Unordered comparison is bag equality
/// over those row keys; ordered comparison requires them positionally.
pub fn tables_equivalent(predicted: &Table, gold: &Table, ordered: bool) -> bool {
    if predicted.rows.len() != gold.rows.len() {
        return false;
    }

    let mut pred_keys: Vec<Vec<String>> = predicted.rows.iter().map(|r| row_key(r)).collect();
    let mut gold_keys: Vec<Vec<String>> = gold.rows.iter().map(|r| row_key(r)).collect();

    if !ordered {
        pred_keys.sort();
        gold_keys.sort();
    }

    pred_keys == gold_keys
}

/// Canonical column-order-insensitive key for one row.
fn row_key(row: &[CellValue]) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().map(canonical_cell).collect();
    cells.sort();
    cells
}

/// Canonical string form of a cell. Numerics round at epsilon scale so
/// floating-point representation noise compares equal; integers and floats
/// share one numeric form (`30` == `30.0`). NULL equals NULL; strings stay
/// case-sensitive.
fn canonical_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "null".to_string(),
        CellValue::Boolean(b) => format!("b:{}", b),
        CellValue::String(s) => format!("s:{}", s),
        CellValue::Integer(_) | CellValue::Float(_) => {
            // as_numeric is total for numeric variants
            let v = cell.as_numeric().unwrap_or(0.0);
            let mut rounded = (v * NUMERIC_EPSILON_SCALE).round() / NUMERIC_EPSILON_SCALE;
            if rounded == 0.0 {
                rounded = 0.0; // fold -0.0 into +0.0
            }
            format!("n:{}", rounded)
        }
    }
}
