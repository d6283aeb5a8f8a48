//! Execution-based evaluation
//!
//! Cross-checks semantic equivalence by running predicted and gold queries
//! through an injected executor capability and comparing result tables.

pub mod comparator;
pub mod executor;
pub mod types;

pub use comparator::{
    compare_execution, tables_equivalent, ExecutionComparison, ExecutionOutcome,
};
pub use executor::{ExecutionError, QueryExecutor, StaticExecutor};
pub use types::{CellValue, Table};
