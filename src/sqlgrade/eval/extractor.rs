//! Clause extraction
//!
//! Splits a raw SQL string into a [`ClauseSet`] by locating clause-introducing
//! keywords at statement top level. The scan tracks parenthesis depth and
//! string literals, so keywords inside subexpressions or quoted text never
//! open a clause. This is deliberately a pragmatic slicer, not a grammar:
//! nested subqueries and CTE bodies stay embedded in the enclosing clause's
//! raw text.

use super::clause::{ClauseKind, ClauseSet};
use super::error::{SqlEvalError, SqlEvalResult};

/// A clause keyword located at top level.
#[derive(Debug, Clone, Copy)]
struct KeywordHit {
    /// Byte offset of the first keyword character.
    start: usize,
    /// Byte offset just past the last keyword character.
    end: usize,
    kind: ClauseKind,
}

/// Keyword phrases in match order. Longer join qualifiers come before the
/// bare forms so `LEFT OUTER JOIN` is not consumed as `OUTER JOIN`.
const PHRASES: &[(&[&str], ClauseKind)] = &[
    (&["left", "outer", "join"], ClauseKind::Join),
    (&["right", "outer", "join"], ClauseKind::Join),
    (&["full", "outer", "join"], ClauseKind::Join),
    (&["left", "join"], ClauseKind::Join),
    (&["right", "join"], ClauseKind::Join),
    (&["inner", "join"], ClauseKind::Join),
    (&["cross", "join"], ClauseKind::Join),
    (&["full", "join"], ClauseKind::Join),
    (&["outer", "join"], ClauseKind::Join),
    (&["join"], ClauseKind::Join),
    (&["group", "by"], ClauseKind::GroupBy),
    (&["order", "by"], ClauseKind::OrderBy),
    (&["select"], ClauseKind::Select),
    (&["from"], ClauseKind::From),
    (&["where"], ClauseKind::Where),
    (&["having"], ClauseKind::Having),
    (&["limit"], ClauseKind::Limit),
];

/// Decompose a raw SQL string into its top-level clauses.
///
/// Fails only when no top-level SELECT keyword is present; every other
/// irregularity degrades to empty clause entries. Each top-level JOIN becomes
/// its own entry (keyword included, so the join kind survives into
/// normalization); all other clauses are sliced after their keyword.
pub fn extract(sql: &str) -> SqlEvalResult<ClauseSet> {
    let hits = scan_keywords(sql);

    if !hits.iter().any(|h| h.kind == ClauseKind::Select) {
        return Err(SqlEvalError::MalformedQuery {
            message: "no top-level SELECT found".to_string(),
        });
    }

    let mut clauses = ClauseSet::new();
    for (i, hit) in hits.iter().enumerate() {
        let slice_end = hits.get(i + 1).map_or(sql.len(), |next| next.start);
        // JOIN entries keep their introducing keyword; other clauses start
        // just past it.
        let slice_start = if hit.kind == ClauseKind::Join {
            hit.start
        } else {
            hit.end
        };
        let text = sql[slice_start..slice_end].trim();
        if !text.is_empty() {
            clauses.push(hit.kind, text.to_string());
        }
    }

    Ok(clauses)
}

/// Single pass over the input collecting top-level keyword hits.
fn scan_keywords(sql: &str) -> Vec<KeywordHit> {
    let bytes = sql.as_bytes();
    let mut hits = Vec::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if let Some(quote) = in_string {
            if c == quote {
                // Doubled quote is an escape, stay inside the literal.
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
            _ if depth == 0 && is_word_start(bytes, i) => {
                if let Some(hit) = match_keyword(sql, i) {
                    i = hit.end;
                    hits.push(hit);
                } else {
                    i = skip_word(bytes, i);
                }
            }
            _ => i += 1,
        }
    }

    hits
}

/// Try each keyword phrase at a word-start position.
fn match_keyword(sql: &str, start: usize) -> Option<KeywordHit> {
    for (words, kind) in PHRASES {
        if let Some(end) = match_phrase(sql, start, words) {
            return Some(KeywordHit { start, end, kind: *kind });
        }
    }
    None
}

/// Match a sequence of words case-insensitively, separated by whitespace,
/// each terminated at a word boundary. Returns the offset past the last word.
fn match_phrase(sql: &str, start: usize, words: &[&str]) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut pos = start;

    for (wi, word) in words.iter().enumerate() {
        if wi > 0 {
            let ws_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos == ws_start {
                return None;
            }
        }
        // Compare on bytes: a str slice here could split a multi-byte
        // character and panic.
        let matched = bytes
            .get(pos..pos + word.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(word.as_bytes()));
        if !matched {
            return None;
        }
        pos += word.len();
        // Reject a prefix match like SELECTED or FROMAGE.
        if pos < bytes.len() && is_word_byte(bytes[pos]) {
            return None;
        }
    }

    Some(pos)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_word_start(bytes: &[u8], i: usize) -> bool {
    bytes[i].is_ascii_alphabetic() && (i == 0 || !is_word_byte(bytes[i - 1]))
}

fn skip_word(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_word_byte(bytes[i]) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query() {
        let clauses = extract("SELECT name, age FROM users WHERE age > 30").unwrap();
        assert_eq!(clauses.get(ClauseKind::Select), ["name, age"]);
        assert_eq!(clauses.get(ClauseKind::From), ["users"]);
        assert_eq!(clauses.get(ClauseKind::Where), ["age > 30"]);
        assert!(clauses.get(ClauseKind::OrderBy).is_empty());
    }

    #[test]
    fn test_no_select_is_malformed() {
        let err = extract("not sql").unwrap_err();
        assert!(matches!(err, SqlEvalError::MalformedQuery { .. }));
    }

    #[test]
    fn test_keyword_inside_string_ignored() {
        let clauses = extract("SELECT name FROM t WHERE note = 'select from where'").unwrap();
        assert_eq!(clauses.get(ClauseKind::From), ["t"]);
        assert_eq!(
            clauses.get(ClauseKind::Where),
            ["note = 'select from where'"]
        );
    }

    #[test]
    fn test_keyword_inside_parens_ignored() {
        let clauses =
            extract("SELECT name FROM t WHERE id IN (SELECT id FROM other) LIMIT 5").unwrap();
        assert_eq!(clauses.get(ClauseKind::Select), ["name"]);
        assert_eq!(
            clauses.get(ClauseKind::Where),
            ["id IN (SELECT id FROM other)"]
        );
        assert_eq!(clauses.get(ClauseKind::Limit), ["5"]);
    }

    #[test]
    fn test_joins_captured_separately() {
        let clauses = extract(
            "SELECT a FROM t1 LEFT JOIN t2 ON t1.id = t2.id JOIN t3 ON t1.id = t3.id WHERE a > 1",
        )
        .unwrap();
        assert_eq!(clauses.get(ClauseKind::From), ["t1"]);
        assert_eq!(
            clauses.get(ClauseKind::Join),
            ["LEFT JOIN t2 ON t1.id = t2.id", "JOIN t3 ON t1.id = t3.id"]
        );
    }

    #[test]
    fn test_prefix_words_not_keywords() {
        // "selected" and "fromage" must not open clauses
        let clauses = extract("SELECT selected, fromage FROM t").unwrap();
        assert_eq!(clauses.get(ClauseKind::Select), ["selected, fromage"]);
        assert_eq!(clauses.get(ClauseKind::From), ["t"]);
    }

    #[test]
    fn test_group_and_order_by() {
        let clauses =
            extract("SELECT a, COUNT(b) FROM t GROUP BY a HAVING COUNT(b) > 2 ORDER BY a DESC")
                .unwrap();
        assert_eq!(clauses.get(ClauseKind::GroupBy), ["a"]);
        assert_eq!(clauses.get(ClauseKind::Having), ["COUNT(b) > 2"]);
        assert_eq!(clauses.get(ClauseKind::OrderBy), ["a DESC"]);
    }
}
