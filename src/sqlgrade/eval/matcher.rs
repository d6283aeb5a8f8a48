//! Component matching
//!
//! Compares normalized predicted vs. gold clause tokens and produces
//! per-clause true-positive / false-positive / false-negative counts with
//! derived precision, recall, and F1.

use super::clause::ClauseKind;
use super::normalizer::{ClauseTokens, NormalizedClause, NormalizedQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Token-level counts for one clause comparison, with derived metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Tokens present in both predicted and gold
    pub true_positive: usize,
    /// Predicted tokens absent from gold
    pub false_positive: usize,
    /// Gold tokens absent from predicted
    pub false_negative: usize,
}

impl MatchResult {
    /// tp / (tp + fp); 1.0 by convention when nothing was predicted.
    pub fn precision(&self) -> f64 {
        let denom = self.true_positive + self.false_positive;
        if denom == 0 {
            1.0
        } else {
            self.true_positive as f64 / denom as f64
        }
    }

    /// tp / (tp + fn); 1.0 by convention when gold is empty.
    pub fn recall(&self) -> f64 {
        let denom = self.true_positive + self.false_negative;
        if denom == 0 {
            1.0
        } else {
            self.true_positive as f64 / denom as f64
        }
    }

    /// Harmonic mean of precision and recall; 0.0 when both are 0.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Match results for every clause kind of one example; total over
/// [`ClauseKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseMatches {
    results: [MatchResult; ClauseKind::COUNT],
}

impl ClauseMatches {
    /// Result for one clause kind.
    pub fn get(&self, kind: ClauseKind) -> &MatchResult {
        &self.results[kind as usize]
    }

    /// Iterate `(kind, result)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ClauseKind, &MatchResult)> {
        ClauseKind::ALL
            .iter()
            .map(move |&kind| (kind, self.get(kind)))
    }
}

/// Match every clause of a predicted query against the gold query.
pub fn match_queries(predicted: &NormalizedQuery, gold: &NormalizedQuery) -> ClauseMatches {
    let mut matches = ClauseMatches::default();
    for kind in ClauseKind::ALL {
        matches.results[kind as usize] = match_clause(predicted.get(kind), gold.get(kind));
    }
    matches
}

/// Match one normalized clause pair.
///
/// Set-valued clauses compare by intersection; ORDER BY compares
/// positionally; LIMIT compares as an exact scalar. A predicted bare
/// `SELECT *` matches any gold SELECT list in full (documented policy).
pub fn match_clause(predicted: &NormalizedClause, gold: &NormalizedClause) -> MatchResult {
    debug_assert_eq!(predicted.kind, gold.kind);

    if predicted.is_wildcard() {
        let gold_len = gold.tokens.len();
        return MatchResult {
            true_positive: gold_len.max(1),
            false_positive: 0,
            false_negative: 0,
        };
    }

    match (&predicted.tokens, &gold.tokens) {
        (ClauseTokens::Set(pred), ClauseTokens::Set(gold)) => match_sets(pred, gold),
        (ClauseTokens::Seq(pred), ClauseTokens::Seq(gold)) => {
            if predicted.kind == ClauseKind::Limit {
                match_scalar(pred, gold)
            } else {
                match_sequences(pred, gold)
            }
        }
        // Kinds agree, so representations agree; unreachable by construction.
        _ => MatchResult::default(),
    }
}

fn match_sets(predicted: &BTreeSet<String>, gold: &BTreeSet<String>) -> MatchResult {
    let true_positive = predicted.intersection(gold).count();
    MatchResult {
        true_positive,
        false_positive: predicted.len() - true_positive,
        false_negative: gold.len() - true_positive,
    }
}

/// Positional comparison: a token counts only when it matches the gold token
/// at the same index.
fn match_sequences(predicted: &[String], gold: &[String]) -> MatchResult {
    let mut result = MatchResult::default();
    let common = predicted.len().min(gold.len());
    for i in 0..common {
        if predicted[i] == gold[i] {
            result.true_positive += 1;
        } else {
            result.false_positive += 1;
            result.false_negative += 1;
        }
    }
    result.false_positive += predicted.len() - common;
    result.false_negative += gold.len() - common;
    result
}

/// LIMIT: exact match is one true positive; a mismatch is simultaneously one
/// false positive and one false negative.
fn match_scalar(predicted: &[String], gold: &[String]) -> MatchResult {
    match (predicted.first(), gold.first()) {
        (None, None) => MatchResult::default(),
        (Some(_), None) => MatchResult {
            false_positive: 1,
            ..Default::default()
        },
        (None, Some(_)) => MatchResult {
            false_negative: 1,
            ..Default::default()
        },
        (Some(p), Some(g)) => {
            if p == g {
                MatchResult {
                    true_positive: 1,
                    ..Default::default()
                }
            } else {
                MatchResult {
                    false_positive: 1,
                    false_negative: 1,
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlgrade::eval::normalizer::normalize;

    fn norm(kind: ClauseKind, text: &str) -> NormalizedClause {
        normalize(kind, &[text.to_string()])
    }

    #[test]
    fn test_set_intersection_counts() {
        let pred = norm(ClauseKind::Select, "name, age, email");
        let gold = norm(ClauseKind::Select, "name, age, city");
        let result = match_clause(&pred, &gold);
        assert_eq!(result.true_positive, 2);
        assert_eq!(result.false_positive, 1);
        assert_eq!(result.false_negative, 1);
        assert!((result.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_empty_is_perfect() {
        let pred = normalize(ClauseKind::Where, &[]);
        let gold = normalize(ClauseKind::Where, &[]);
        let result = match_clause(&pred, &gold);
        assert_eq!(result.precision(), 1.0);
        assert_eq!(result.recall(), 1.0);
        assert_eq!(result.f1(), 1.0);
    }

    #[test]
    fn test_wildcard_forces_full_credit() {
        let pred = norm(ClauseKind::Select, "*");
        let gold = norm(ClauseKind::Select, "name, age");
        let result = match_clause(&pred, &gold);
        assert_eq!(result.precision(), 1.0);
        assert_eq!(result.recall(), 1.0);
        assert_eq!(result.f1(), 1.0);
    }

    #[test]
    fn test_gold_wildcard_not_special() {
        let pred = norm(ClauseKind::Select, "name, age");
        let gold = norm(ClauseKind::Select, "*");
        let result = match_clause(&pred, &gold);
        assert_eq!(result.true_positive, 0);
    }

    #[test]
    fn test_order_by_is_positional() {
        let pred = norm(ClauseKind::OrderBy, "age ASC, name DESC");
        let gold = norm(ClauseKind::OrderBy, "name DESC, age ASC");
        let result = match_clause(&pred, &gold);
        assert_eq!(result.true_positive, 0);
        assert_eq!(result.false_positive, 2);
        assert_eq!(result.false_negative, 2);
    }

    #[test]
    fn test_limit_scalar() {
        let result = match_clause(
            &norm(ClauseKind::Limit, "10"),
            &norm(ClauseKind::Limit, "10"),
        );
        assert_eq!(result.true_positive, 1);

        let result = match_clause(
            &norm(ClauseKind::Limit, "10"),
            &norm(ClauseKind::Limit, "20"),
        );
        assert_eq!(result.false_positive, 1);
        assert_eq!(result.false_negative, 1);
    }

    #[test]
    fn test_metrics_bounded() {
        let cases = [
            ("a, b, c", "d, e"),
            ("", "a"),
            ("a", ""),
            ("a, b", "a, b"),
        ];
        for (p, g) in cases {
            let result = match_clause(
                &norm(ClauseKind::Select, p),
                &norm(ClauseKind::Select, g),
            );
            for value in [result.precision(), result.recall(), result.f1()] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
