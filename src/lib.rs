//! # sqlgrade
//!
//! A SQL evaluation engine for natural-language-to-SQL systems: decomposes a
//! generated query and a gold reference query into structural clauses,
//! computes calibrated per-clause and overall similarity metrics, and
//! optionally cross-checks semantic equivalence by executing both queries
//! and comparing result sets.
//!
//! ## Features
//!
//! - **Clause-Level Decomposition**: pragmatic top-level slicing of SELECT,
//!   FROM, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT, and per-JOIN clauses
//! - **Calibrated Metrics**: token-level precision/recall/F1 per clause,
//!   micro-averaged overall, plus table-set Jaccard similarity
//! - **Execution Comparison**: optional result-set equivalence through an
//!   injected `QueryExecutor` capability, with bag equality and numeric
//!   epsilon tolerance
//! - **Robust Batch Runs**: bounded-concurrency evaluation where bad
//!   examples degrade to zeroed records instead of aborting the batch
//! - **Flat Artifacts**: one-row-per-example JSON/CSV output stable enough
//!   for system-vs-system comparison by index
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlgrade::{EvalExample, EvalMode, EvaluationRunner, RunnerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = EvaluationRunner::new(RunnerConfig::default());
//!
//!     let examples = vec![
//!         EvalExample::new(
//!             "SELECT name, age FROM users WHERE age > 30",
//!             "SELECT age, name FROM users WHERE age > 30",
//!         )
//!         .with_question("Who is over thirty?"),
//!     ];
//!
//!     let batch = runner.run(examples, EvalMode::ComponentOnly).await;
//!     println!("mean F1: {:.3}", batch.summary.mean_f1);
//! }
//! ```

pub mod sqlgrade;

// Re-export the main API at the crate root for easy access
pub use sqlgrade::eval::{
    aggregate,
    extract,
    match_clause,
    match_queries,
    normalize,
    normalize_query,
    table_similarity,
    // Core types
    ClauseKind,
    ClauseMatches,
    ClauseSet,
    ClauseTokens,
    MatchResult,
    NormalizedClause,
    NormalizedQuery,
    OverallMetrics,
    // Errors
    SqlEvalError,
    SqlEvalResult,
};
pub use sqlgrade::exec::{
    compare_execution, CellValue, ExecutionComparison, ExecutionError, ExecutionOutcome,
    QueryExecutor, StaticExecutor, Table,
};
pub use sqlgrade::report::{
    compare_batches, flat_rows, write_csv, write_json, BatchComparison, FlatRow,
};
pub use sqlgrade::runner::{
    BatchSummary, EvalExample, EvalMode, EvaluationBatch, EvaluationRecord, EvaluationRunner,
    RunnerConfig, RunnerHandle, GENERIC_SQL_DIALECT,
};
