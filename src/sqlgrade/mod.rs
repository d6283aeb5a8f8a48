//! SQL evaluation engine modules

/// Clause extraction, normalization, matching, and aggregate scoring.
pub mod eval;
/// Execution-based comparison through an injected executor capability.
pub mod exec;
/// Flat artifact rows, JSON/CSV writers, and batch comparison.
pub mod report;
/// Concurrent batch evaluation driver.
pub mod runner;
