//! Aggregate scoring
//!
//! Rolls per-clause match results into overall metrics. Overall
//! precision/recall/F1 are micro-averaged: tp/fp/fn are summed across clause
//! kinds before deriving rates, so empty clauses do not dilute the score the
//! way a mean of per-clause F1 values would.

use super::clause::{ClauseKind, ClauseSet};
use super::matcher::{ClauseMatches, MatchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Query-level similarity metrics for one example.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallMetrics {
    /// Micro-averaged precision over all clause kinds
    pub precision: f64,
    /// Micro-averaged recall over all clause kinds
    pub recall: f64,
    /// F1 of the micro-averaged precision and recall
    pub f1: f64,
    /// Jaccard similarity of the referenced table-name sets
    pub table_similarity: f64,
}

/// Micro-average the per-clause counts into overall metrics.
pub fn aggregate(matches: &ClauseMatches, table_similarity: f64) -> OverallMetrics {
    let mut summed = MatchResult::default();
    for (_, result) in matches.iter() {
        summed.true_positive += result.true_positive;
        summed.false_positive += result.false_positive;
        summed.false_negative += result.false_negative;
    }

    OverallMetrics {
        precision: summed.precision(),
        recall: summed.recall(),
        f1: summed.f1(),
        table_similarity,
    }
}

/// Jaccard similarity of the table-name sets referenced by two queries.
pub fn table_similarity(predicted: &ClauseSet, gold: &ClauseSet) -> f64 {
    let pred_tables = table_names(predicted);
    let gold_tables = table_names(gold);

    let intersection = pred_tables.intersection(&gold_tables).count();
    let union = pred_tables.union(&gold_tables).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Table names referenced by a query: FROM entries (aliases dropped) plus
/// the target table of each JOIN entry.
pub fn table_names(clauses: &ClauseSet) -> BTreeSet<String> {
    let mut tables = BTreeSet::new();

    for part in clauses.get(ClauseKind::From) {
        for item in part.split(',') {
            if let Some(name) = item.split_whitespace().next() {
                tables.insert(name.to_lowercase());
            }
        }
    }

    for part in clauses.get(ClauseKind::Join) {
        // Entries keep their introducing keyword: the target table is the
        // first identifier after "join".
        let lowered = part.to_lowercase();
        let mut words = lowered.split_whitespace();
        while let Some(word) = words.next() {
            if word == "join" {
                if let Some(table) = words.next() {
                    tables.insert(table.to_string());
                }
                break;
            }
        }
    }

    tables
}
