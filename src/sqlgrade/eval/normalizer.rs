//! Clause normalization
//!
//! Canonicalizes raw clause text into comparable token representations:
//! - case folding and whitespace collapse
//! - `AS` alias and table-qualifier stripping (with a collision fallback)
//! - operator canonicalization (`==` -> `=`, `<>` -> `!=`)
//! - splitting list-valued clauses on top-level commas / AND
//! - sorted token sets for order-insensitive clauses, sequences for
//!   ORDER BY and LIMIT
//!
//! Normalization is deterministic and idempotent: feeding a produced token
//! back through the pipeline is the identity.

use super::clause::{ClauseKind, ClauseSet};
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel token produced by a bare `SELECT *` projection.
pub const WILDCARD_TOKEN: &str = "*";

/// Canonical token representation of one clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseTokens {
    /// Order-insensitive clauses (SELECT, FROM, WHERE, GROUP BY, HAVING, JOIN)
    Set(BTreeSet<String>),
    /// Order-sensitive clauses (ORDER BY, LIMIT)
    Seq(Vec<String>),
}

impl ClauseTokens {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        match self {
            ClauseTokens::Set(s) => s.len(),
            ClauseTokens::Seq(s) => s.len(),
        }
    }

    /// True when the clause is absent.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A clause kind plus its canonical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedClause {
    pub kind: ClauseKind,
    pub tokens: ClauseTokens,
}

impl NormalizedClause {
    /// True when the predicted SELECT list is the bare wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.kind == ClauseKind::Select
            && match &self.tokens {
                ClauseTokens::Set(s) => s.len() == 1 && s.contains(WILDCARD_TOKEN),
                ClauseTokens::Seq(_) => false,
            }
    }
}

/// All clauses of one query in normalized form; total over [`ClauseKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    clauses: Vec<NormalizedClause>,
}

impl NormalizedQuery {
    /// Normalized tokens for one clause kind.
    pub fn get(&self, kind: ClauseKind) -> &NormalizedClause {
        &self.clauses[kind as usize]
    }

    /// Iterate clauses in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedClause> {
        self.clauses.iter()
    }
}

/// Normalize every clause of an extracted [`ClauseSet`].
pub fn normalize_query(clauses: &ClauseSet) -> NormalizedQuery {
    let normalized = ClauseKind::ALL
        .iter()
        .map(|&kind| normalize(kind, clauses.get(kind)))
        .collect();
    NormalizedQuery { clauses: normalized }
}

/// Normalize the raw parts of a single clause kind.
pub fn normalize(kind: ClauseKind, parts: &[String]) -> NormalizedClause {
    let items = match kind {
        ClauseKind::Select => {
            let mut items = Vec::new();
            for part in parts {
                let text = strip_leading_distinct(part);
                items.extend(split_top_level(&text, Separator::Comma));
            }
            items
        }
        ClauseKind::From | ClauseKind::GroupBy | ClauseKind::OrderBy => parts
            .iter()
            .flat_map(|p| split_top_level(p, Separator::Comma))
            .collect(),
        ClauseKind::Where | ClauseKind::Having => parts
            .iter()
            .flat_map(|p| split_top_level(p, Separator::And))
            .collect(),
        // JOIN entries arrive pre-split, LIMIT is a single scalar.
        ClauseKind::Join | ClauseKind::Limit => parts.to_vec(),
    };

    let mut tokens: Vec<String> = items
        .iter()
        .map(|item| canonical_expr(item))
        .filter(|t| !t.is_empty())
        .collect();

    match kind {
        ClauseKind::From => {
            // Table references reduce to the bare table name; aliases drop.
            for token in &mut tokens {
                if let Some(first) = token.split_whitespace().next() {
                    *token = first.to_string();
                }
            }
        }
        ClauseKind::Limit => {
            // Canonical integer form when the value parses.
            for token in &mut tokens {
                if let Ok(n) = token.trim().parse::<i64>() {
                    *token = n.to_string();
                }
            }
        }
        ClauseKind::OrderBy => {
            for token in &mut tokens {
                *token = with_explicit_direction(token);
            }
        }
        _ => {}
    }

    if kind != ClauseKind::From && kind != ClauseKind::Limit {
        strip_qualifiers(&mut tokens);
    }

    let tokens = if kind.is_order_sensitive() {
        ClauseTokens::Seq(tokens)
    } else {
        ClauseTokens::Set(tokens.into_iter().collect())
    };

    NormalizedClause { kind, tokens }
}

/// Canonicalize one expression: lowercase, collapse whitespace, strip `AS`
/// aliases and identifier quoting, canonicalize operators, drop redundant
/// outer parentheses.
fn canonical_expr(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let unaliased = strip_as_aliases(&collapsed);
    let unquoted: String = unaliased.chars().filter(|c| *c != '"' && *c != '`').collect();
    let ops = canonical_operators(&unquoted);
    let squeezed = squeeze_operator_spacing(&ops);
    strip_outer_parens(&squeezed)
}

enum Separator {
    Comma,
    And,
}

/// Split on a separator occurring at paren depth 0, outside string literals.
fn split_top_level(text: &str, sep: Separator) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if let Some(quote) = in_string {
            if c == quote {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                    continue;
                }
                in_string = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'\'' | b'"' => {
                in_string = Some(c);
                i += 1;
            }
            b'(' | b'[' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' => {
                depth -= 1;
                i += 1;
            }
            _ if depth == 0 => match sep {
                Separator::Comma if c == b',' => {
                    parts.push(text[start..i].to_string());
                    i += 1;
                    start = i;
                }
                Separator::And if word_at_ci(bytes, i, "and") => {
                    parts.push(text[start..i].to_string());
                    i += 3;
                    start = i;
                }
                _ => i += 1,
            },
            _ => i += 1,
        }
    }
    parts.push(text[start..].to_string());
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

fn word_at_ci(bytes: &[u8], i: usize, word: &str) -> bool {
    if i + word.len() > bytes.len() {
        return false;
    }
    let slice = &bytes[i..i + word.len()];
    if !slice.eq_ignore_ascii_case(word.as_bytes()) {
        return false;
    }
    let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
    let after_ok = i + word.len() == bytes.len() || !is_word_byte(bytes[i + word.len()]);
    before_ok && after_ok
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Drop a leading DISTINCT from a SELECT list.
fn strip_leading_distinct(text: &str) -> String {
    let trimmed = text.trim_start();
    let is_distinct = trimmed
        .get(..8)
        .is_some_and(|p| p.eq_ignore_ascii_case("distinct"));
    if is_distinct {
        let rest = &trimmed[8..];
        if rest.starts_with(char::is_whitespace) {
            return rest.trim_start().to_string();
        }
    }
    text.to_string()
}

/// Remove ` as <alias>` sequences (input is already lowercased/collapsed).
fn strip_as_aliases(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(" as ") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 4..];
        let alias_end = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        rest = &after[alias_end..];
    }
    out.push_str(rest);
    out
}

/// `<>` -> `!=`, `==` -> `=`.
fn canonical_operators(text: &str) -> String {
    text.replace("<>", "!=").replace("==", "=")
}

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '+', '-', '*', '/', '%', ',', '(', ')'];

/// Remove whitespace adjacent to operator characters so `age > 30` and
/// `age>30` share one canonical form. String literal content is left
/// untouched (only single quotes remain at this stage; double and backtick
/// quoting is already stripped).
fn squeeze_operator_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            i += 1;
            continue;
        }
        if c == '\'' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }
        if c == ' ' {
            let prev_op = i > 0 && OPERATOR_CHARS.contains(&chars[i - 1]);
            let next_op = i + 1 < chars.len() && OPERATOR_CHARS.contains(&chars[i + 1]);
            if prev_op || next_op {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Strip parentheses that wrap the entire expression.
fn strip_outer_parens(text: &str) -> String {
    let mut current = text.trim();
    while current.len() >= 2 && current.starts_with('(') && current.ends_with(')') {
        // Only strip when the opening paren closes at the very end.
        let mut depth = 0;
        let mut wraps = true;
        for (i, c) in current.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 && i + 1 < current.len() {
                        wraps = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !wraps {
            break;
        }
        current = current[1..current.len() - 1].trim();
    }
    current.to_string()
}

/// Ensure an ORDER BY token carries an explicit direction.
fn with_explicit_direction(token: &str) -> String {
    if token.ends_with(" asc") || token.ends_with(" desc") {
        token.to_string()
    } else {
        format!("{} asc", token)
    }
}

/// Strip table-alias qualifiers from column references, keeping the
/// qualified form for any column name that appears under two or more
/// distinct qualifiers within the clause (the collision fallback).
fn strip_qualifiers(tokens: &mut [String]) {
    let mut qualifiers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for token in tokens.iter() {
        for (qualifier, column) in qualified_refs(token) {
            qualifiers.entry(column).or_default().insert(qualifier);
        }
    }

    for token in tokens.iter_mut() {
        let mut out = String::with_capacity(token.len());
        let mut rest = token.as_str();
        while let Some((before, qualifier, column, after)) = next_qualified_ref(rest) {
            out.push_str(before);
            let colliding = qualifiers.get(column).is_some_and(|q| q.len() > 1);
            if colliding {
                out.push_str(qualifier);
                out.push('.');
            }
            out.push_str(column);
            rest = after;
        }
        out.push_str(rest);
        *token = out;
    }
}

/// All `qualifier.column` references within a token.
fn qualified_refs(token: &str) -> Vec<(String, String)> {
    let mut refs = Vec::new();
    let mut rest = token;
    while let Some((_, qualifier, column, after)) = next_qualified_ref(rest) {
        refs.push((qualifier.to_string(), column.to_string()));
        rest = after;
    }
    refs
}

/// Locate the next `ident.ident` reference; returns (text before it, the
/// qualifier, the column, text after it).
fn next_qualified_ref(text: &str) -> Option<(&str, &str, &str, &str)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'.' && i > 0 {
            // Walk back over the qualifier.
            let mut q_start = i;
            while q_start > 0 && is_ident_byte(bytes[q_start - 1]) {
                q_start -= 1;
            }
            // Walk forward over the column.
            let mut c_end = i + 1;
            while c_end < bytes.len() && is_ident_byte(bytes[c_end]) {
                c_end += 1;
            }
            let qualifier = &text[q_start..i];
            let column = &text[i + 1..c_end];
            let valid = !qualifier.is_empty()
                && !column.is_empty()
                && qualifier.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && column.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            if valid {
                return Some((&text[..q_start], qualifier, column, &text[c_end..]));
            }
        }
        i += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
