//! Batch reporting artifact
//!
//! Flattens an [`EvaluationBatch`] into one row per example for downstream
//! reporting and visualization collaborators, and compares two batches
//! (system-vs-system) by aligning rows on example index. No rendering
//! dependency lives here: the artifact is plain JSON or CSV written through
//! any `std::io::Write`.

use crate::sqlgrade::eval::clause::ClauseKind;
use crate::sqlgrade::runner::batch::{EvaluationBatch, EvaluationRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

/// One flat artifact row per example. Metric columns are stable within a
/// run, so two batches align row-by-row for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatRow {
    /// Example index within the batch
    pub index: usize,
    /// Natural-language question, when supplied
    pub question: Option<String>,
    /// Per-clause and overall metric columns
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
    /// Execution outcome name
    pub outcome: String,
    /// Extraction failure text, when degraded
    pub extraction_error: Option<String>,
    /// Predicted-query execution error text
    pub predicted_error: Option<String>,
    /// Gold-query execution error text
    pub gold_error: Option<String>,
}

/// Flatten a batch into artifact rows, in example order.
pub fn flat_rows(batch: &EvaluationBatch) -> Vec<FlatRow> {
    batch.records.iter().map(flat_row).collect()
}

fn flat_row(record: &EvaluationRecord) -> FlatRow {
    let mut metrics = BTreeMap::new();
    for kind in ClauseKind::ALL {
        let (precision, recall, f1) = if record.is_degraded() {
            (0.0, 0.0, 0.0)
        } else {
            let result = record.clause_matches.get(kind);
            (result.precision(), result.recall(), result.f1())
        };
        metrics.insert(format!("{}_precision", kind.name()), precision);
        metrics.insert(format!("{}_recall", kind.name()), recall);
        metrics.insert(format!("{}_f1", kind.name()), f1);
    }
    metrics.insert("overall_precision".to_string(), record.overall.precision);
    metrics.insert("overall_recall".to_string(), record.overall.recall);
    metrics.insert("overall_f1".to_string(), record.overall.f1);
    metrics.insert(
        "table_similarity".to_string(),
        record.overall.table_similarity,
    );

    FlatRow {
        index: record.index,
        question: record.question.clone(),
        metrics,
        outcome: record.execution.outcome.name().to_string(),
        extraction_error: record.extraction_error.clone(),
        predicted_error: record.execution.predicted_error.clone(),
        gold_error: record.execution.gold_error.clone(),
    }
}

/// Write the full batch envelope as pretty JSON.
pub fn write_json(batch: &EvaluationBatch, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(batch)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    writeln!(writer, "{}", json)
}

/// Write flat rows as CSV with a stable header.
pub fn write_csv(rows: &[FlatRow], writer: &mut dyn Write) -> std::io::Result<()> {
    let mut header: Vec<String> = vec!["index".to_string(), "question".to_string()];
    for kind in ClauseKind::ALL {
        header.push(format!("{}_precision", kind.name()));
        header.push(format!("{}_recall", kind.name()));
        header.push(format!("{}_f1", kind.name()));
    }
    header.extend(
        [
            "overall_precision",
            "overall_recall",
            "overall_f1",
            "table_similarity",
            "outcome",
            "extraction_error",
            "predicted_error",
            "gold_error",
        ]
        .map(String::from),
    );
    writeln!(writer, "{}", header.join(","))?;

    for row in rows {
        let mut fields: Vec<String> = vec![
            row.index.to_string(),
            escape_csv(row.question.as_deref().unwrap_or("")),
        ];
        for column in &header[2..header.len() - 4] {
            let value = row.metrics.get(column).copied().unwrap_or(0.0);
            fields.push(format!("{:.6}", value));
        }
        fields.push(escape_csv(&row.outcome));
        fields.push(escape_csv(row.extraction_error.as_deref().unwrap_or("")));
        fields.push(escape_csv(row.predicted_error.as_deref().unwrap_or("")));
        fields.push(escape_csv(row.gold_error.as_deref().unwrap_or("")));
        writeln!(writer, "{}", fields.join(","))?;
    }

    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// System-vs-system comparison of two batches, aligned by example index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchComparison {
    /// Run id of the baseline batch
    pub baseline_run_id: String,
    /// Run id of the candidate batch
    pub candidate_run_id: String,
    /// candidate minus baseline, mean overall precision
    pub mean_precision_delta: f64,
    /// candidate minus baseline, mean overall recall
    pub mean_recall_delta: f64,
    /// candidate minus baseline, mean overall F1
    pub mean_f1_delta: f64,
    /// candidate minus baseline, execution match rate
    pub execution_match_rate_delta: f64,
    /// Per-example overall-F1 delta over the common index range
    pub per_example_f1_delta: Vec<f64>,
    /// True when the two batches have different lengths
    pub length_mismatch: bool,
}

/// Compare a candidate batch against a baseline.
pub fn compare_batches(baseline: &EvaluationBatch, candidate: &EvaluationBatch) -> BatchComparison {
    let common = baseline.records.len().min(candidate.records.len());
    let per_example_f1_delta = (0..common)
        .map(|i| candidate.records[i].overall.f1 - baseline.records[i].overall.f1)
        .collect();

    BatchComparison {
        baseline_run_id: baseline.run_id.clone(),
        candidate_run_id: candidate.run_id.clone(),
        mean_precision_delta: candidate.summary.mean_precision - baseline.summary.mean_precision,
        mean_recall_delta: candidate.summary.mean_recall - baseline.summary.mean_recall,
        mean_f1_delta: candidate.summary.mean_f1 - baseline.summary.mean_f1,
        execution_match_rate_delta: candidate.summary.execution_match_rate
            - baseline.summary.execution_match_rate,
        per_example_f1_delta,
        length_mismatch: baseline.records.len() != candidate.records.len(),
    }
}
