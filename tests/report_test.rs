//! Reporting artifact integration tests
//!
//! Flat rows, JSON/CSV output, and system-vs-system batch comparison.

use sqlgrade::{
    compare_batches, flat_rows, write_csv, write_json, EvalExample, EvalMode, EvaluationBatch,
    EvaluationRunner, RunnerConfig,
};

async fn run_batch(run_id: &str, examples: Vec<EvalExample>) -> EvaluationBatch {
    let runner = EvaluationRunner::new(RunnerConfig {
        run_id: run_id.to_string(),
        ..Default::default()
    });
    runner.run(examples, EvalMode::ComponentOnly).await
}

fn examples() -> Vec<EvalExample> {
    vec![
        EvalExample::new("SELECT a, b FROM t WHERE x = 1", "SELECT a, b FROM t WHERE x = 1")
            .with_question("exact match"),
        EvalExample::new("SELECT a FROM t", "SELECT a, b FROM t"),
        EvalExample::new("not sql", "SELECT a FROM t"),
    ]
}

#[tokio::test]
async fn test_flat_rows_have_per_clause_columns() {
    let batch = run_batch("rows", examples()).await;
    let rows = flat_rows(&batch);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].question.as_deref(), Some("exact match"));
    assert_eq!(rows[0].metrics["select_f1"], 1.0);
    assert_eq!(rows[0].metrics["overall_f1"], 1.0);
    assert!(rows[1].metrics["select_recall"] < 1.0);

    // The degraded example reports zeros across the board.
    assert_eq!(rows[2].metrics["select_f1"], 0.0);
    assert_eq!(rows[2].metrics["overall_f1"], 0.0);
    assert!(rows[2].extraction_error.is_some());
}

#[tokio::test]
async fn test_json_envelope_round_trips() {
    let batch = run_batch("json", examples()).await;
    let mut out = Vec::new();
    write_json(&batch, &mut out).unwrap();

    let parsed: EvaluationBatch = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed.run_id, "json");
    assert_eq!(parsed.records.len(), batch.records.len());
    assert_eq!(parsed.summary.total, 3);
    assert_eq!(parsed.dialect, "generic-sql");
}

#[tokio::test]
async fn test_csv_stable_within_run() {
    let batch = run_batch("csv", examples()).await;
    let rows = flat_rows(&batch);

    let mut first = Vec::new();
    write_csv(&rows, &mut first).unwrap();
    let mut second = Vec::new();
    write_csv(&rows, &mut second).unwrap();
    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + rows.len());
    let header_columns = lines[0].split(',').count();
    // Every row fills every column (quoted fields contain no commas here).
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), header_columns);
    }
}

#[tokio::test]
async fn test_compare_batches_aligns_by_index() {
    let baseline = run_batch("baseline", examples()).await;

    // The candidate system fixes the second and third examples.
    let improved = vec![
        EvalExample::new("SELECT a, b FROM t WHERE x = 1", "SELECT a, b FROM t WHERE x = 1"),
        EvalExample::new("SELECT a, b FROM t", "SELECT a, b FROM t"),
        EvalExample::new("SELECT a FROM t", "SELECT a FROM t"),
    ];
    let candidate = run_batch("candidate", improved).await;

    let comparison = compare_batches(&baseline, &candidate);
    assert_eq!(comparison.baseline_run_id, "baseline");
    assert_eq!(comparison.candidate_run_id, "candidate");
    assert!(!comparison.length_mismatch);
    assert_eq!(comparison.per_example_f1_delta.len(), 3);
    assert_eq!(comparison.per_example_f1_delta[0], 0.0);
    assert!(comparison.per_example_f1_delta[1] > 0.0);
    assert!(comparison.per_example_f1_delta[2] > 0.0);
    assert!(comparison.mean_f1_delta > 0.0);
}

#[tokio::test]
async fn test_compare_batches_length_mismatch_flagged() {
    let baseline = run_batch("short", examples()[..2].to_vec()).await;
    let candidate = run_batch("long", examples()).await;

    let comparison = compare_batches(&baseline, &candidate);
    assert!(comparison.length_mismatch);
    assert_eq!(comparison.per_example_f1_delta.len(), 2);
}
