//! Query executor capability
//!
//! The engine treats query execution as an injected capability with a narrow
//! contract: `execute(sql) -> Result<Table, ExecutionError>`. Callers wire in
//! whatever backing store they have; tests substitute [`StaticExecutor`].

use super::types::Table;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Failure modes reported by an executor.
///
/// These are captured into evaluation records, never raised across the batch
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The backing store could not be reached
    Connectivity { message: String },
    /// The backing engine rejected the query
    Rejected { message: String },
    /// The call exceeded the caller-supplied timeout
    Timeout { timeout_ms: u64 },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Connectivity { message } => {
                write!(f, "connectivity error: {}", message)
            }
            ExecutionError::Rejected { message } => {
                write!(f, "query rejected: {}", message)
            }
            ExecutionError::Timeout { timeout_ms } => {
                write!(f, "execution timed out after {}ms", timeout_ms)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

/// Capability for executing SQL against some backing store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute one query and return its result table.
    async fn execute(&self, sql: &str) -> Result<Table, ExecutionError>;
}

/// In-memory executor mapping exact SQL strings to canned responses.
///
/// The standard substitute for a live backing store in tests: register each
/// query with its result (or error) up front.
#[derive(Default)]
pub struct StaticExecutor {
    responses: HashMap<String, Result<Table, ExecutionError>>,
}

impl StaticExecutor {
    /// Create an empty executor; unregistered queries are rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a successful result for a query.
    pub fn with_result(mut self, sql: &str, table: Table) -> Self {
        self.responses.insert(sql.to_string(), Ok(table));
        self
    }

    /// Register a failure for a query.
    pub fn with_error(mut self, sql: &str, error: ExecutionError) -> Self {
        self.responses.insert(sql.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl QueryExecutor for StaticExecutor {
    async fn execute(&self, sql: &str) -> Result<Table, ExecutionError> {
        match self.responses.get(sql) {
            Some(response) => response.clone(),
            None => Err(ExecutionError::Rejected {
                message: format!("no registered result for query: {}", sql),
            }),
        }
    }
}
