//! Clause-level data model
//!
//! SQL queries are decomposed into a fixed set of clause kinds. Every kind is
//! always present in a [`ClauseSet`] (an empty entry means the clause is
//! absent from the query), so predicted and gold queries can be compared
//! symmetrically without missing-key handling.

use serde::{Deserialize, Serialize};

/// The canonical SQL clause categories recognized by the evaluation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    /// SELECT projection list
    Select,
    /// FROM table list (joins excluded, see `Join`)
    From,
    /// WHERE predicate
    Where,
    /// GROUP BY expression list
    GroupBy,
    /// HAVING predicate
    Having,
    /// ORDER BY expression list (order-sensitive)
    OrderBy,
    /// LIMIT row count (scalar)
    Limit,
    /// Each top-level JOIN, in source order
    Join,
}

impl ClauseKind {
    /// Number of clause kinds; sizes the total arrays indexed by `as usize`.
    pub const COUNT: usize = 8;

    /// All clause kinds in canonical iteration order.
    pub const ALL: [ClauseKind; Self::COUNT] = [
        ClauseKind::Select,
        ClauseKind::From,
        ClauseKind::Where,
        ClauseKind::GroupBy,
        ClauseKind::Having,
        ClauseKind::OrderBy,
        ClauseKind::Limit,
        ClauseKind::Join,
    ];

    /// Stable lowercase name used in artifact column headers.
    pub fn name(&self) -> &'static str {
        match self {
            ClauseKind::Select => "select",
            ClauseKind::From => "from",
            ClauseKind::Where => "where",
            ClauseKind::GroupBy => "group_by",
            ClauseKind::Having => "having",
            ClauseKind::OrderBy => "order_by",
            ClauseKind::Limit => "limit",
            ClauseKind::Join => "join",
        }
    }

    /// Whether token order carries meaning for this clause.
    ///
    /// ORDER BY and LIMIT compare positionally; everything else compares as
    /// a token set.
    pub fn is_order_sensitive(&self) -> bool {
        matches!(self, ClauseKind::OrderBy | ClauseKind::Limit)
    }
}

impl std::fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Total mapping from clause kind to the raw substrings extracted from one
/// query.
///
/// Every kind is always present; JOIN may hold several entries (one per
/// top-level join), the others hold zero or one raw slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    parts: [Vec<String>; ClauseKind::COUNT],
}

impl ClauseSet {
    /// Create an all-empty clause set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw parts for one clause kind.
    pub fn get(&self, kind: ClauseKind) -> &[String] {
        &self.parts[kind as usize]
    }

    /// Append a raw part to a clause kind.
    pub fn push(&mut self, kind: ClauseKind, part: String) {
        self.parts[kind as usize].push(part);
    }

    /// True when no clause holds any text.
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.is_empty())
    }

    /// Iterate `(kind, parts)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ClauseKind, &[String])> {
        ClauseKind::ALL
            .iter()
            .map(move |&kind| (kind, self.get(kind)))
    }
}
