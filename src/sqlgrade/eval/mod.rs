//! Component-level SQL evaluation pipeline
//!
//! Raw SQL flows one way through this namespace:
//! clause extraction -> normalization -> matching -> aggregate scoring.
//! Every stage is a pure function; the batch runner drives them per example.

pub mod clause;
pub mod error;
pub mod extractor;
pub mod matcher;
pub mod normalizer;
pub mod scorer;

pub use clause::{ClauseKind, ClauseSet};
pub use error::{SqlEvalError, SqlEvalResult};
pub use extractor::extract;
pub use matcher::{match_clause, match_queries, ClauseMatches, MatchResult};
pub use normalizer::{
    normalize, normalize_query, ClauseTokens, NormalizedClause, NormalizedQuery, WILDCARD_TOKEN,
};
pub use scorer::{aggregate, table_names, table_similarity, OverallMetrics};
