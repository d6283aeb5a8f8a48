//! Clause extraction integration tests
//!
//! Covers top-level keyword slicing: paren/literal awareness, per-JOIN
//! capture, graceful degradation, and the malformed-query error.

use sqlgrade::{extract, ClauseKind, SqlEvalError};

#[test]
fn test_full_query_decomposition() {
    let sql = "SELECT c.customer_name, COUNT(o.order_id) AS order_count \
               FROM customers c \
               JOIN orders o ON c.customer_id = o.customer_id \
               WHERE o.order_date >= '2022-01-01' \
               GROUP BY c.customer_name \
               ORDER BY order_count DESC \
               LIMIT 10";
    let clauses = extract(sql).unwrap();

    assert_eq!(
        clauses.get(ClauseKind::Select),
        ["c.customer_name, COUNT(o.order_id) AS order_count"]
    );
    assert_eq!(clauses.get(ClauseKind::From), ["customers c"]);
    assert_eq!(
        clauses.get(ClauseKind::Join),
        ["JOIN orders o ON c.customer_id = o.customer_id"]
    );
    assert_eq!(
        clauses.get(ClauseKind::Where),
        ["o.order_date >= '2022-01-01'"]
    );
    assert_eq!(clauses.get(ClauseKind::GroupBy), ["c.customer_name"]);
    assert_eq!(clauses.get(ClauseKind::OrderBy), ["order_count DESC"]);
    assert_eq!(clauses.get(ClauseKind::Limit), ["10"]);
    assert!(clauses.get(ClauseKind::Having).is_empty());
}

#[test]
fn test_multiline_query() {
    let sql = "SELECT name,\n       age\nFROM users\nWHERE age > 30\n";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::Select), ["name,\n       age"]);
    assert_eq!(clauses.get(ClauseKind::From), ["users"]);
}

#[test]
fn test_missing_clauses_stay_empty() {
    let clauses = extract("SELECT 1").unwrap();
    assert_eq!(clauses.get(ClauseKind::Select), ["1"]);
    for kind in [
        ClauseKind::From,
        ClauseKind::Where,
        ClauseKind::GroupBy,
        ClauseKind::Having,
        ClauseKind::OrderBy,
        ClauseKind::Limit,
        ClauseKind::Join,
    ] {
        assert!(clauses.get(kind).is_empty(), "{} should be empty", kind);
    }
}

#[test]
fn test_malformed_query_errors() {
    for bad in ["not sql", "", "UPDATE t SET a = 1"] {
        let err = extract(bad).unwrap_err();
        assert!(matches!(err, SqlEvalError::MalformedQuery { .. }), "{:?}", bad);
    }
}

#[test]
fn test_subquery_stays_inside_enclosing_clause() {
    let sql = "SELECT id FROM orders WHERE customer_id IN \
               (SELECT id FROM customers WHERE active = 1) ORDER BY id";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::From), ["orders"]);
    assert_eq!(
        clauses.get(ClauseKind::Where),
        ["customer_id IN (SELECT id FROM customers WHERE active = 1)"]
    );
    assert_eq!(clauses.get(ClauseKind::OrderBy), ["id"]);
}

#[test]
fn test_string_literal_keywords_ignored() {
    let sql = "SELECT label FROM t WHERE label = 'order by limit from'";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::Where), ["label = 'order by limit from'"]);
    assert!(clauses.get(ClauseKind::OrderBy).is_empty());
    assert!(clauses.get(ClauseKind::Limit).is_empty());
}

#[test]
fn test_escaped_quote_inside_literal() {
    let sql = "SELECT a FROM t WHERE note = 'it''s from b'";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::From), ["t"]);
    assert_eq!(clauses.get(ClauseKind::Where), ["note = 'it''s from b'"]);
}

#[test]
fn test_join_varieties() {
    let sql = "SELECT a FROM t1 \
               INNER JOIN t2 ON t1.id = t2.id \
               LEFT OUTER JOIN t3 ON t1.id = t3.id \
               CROSS JOIN t4";
    let clauses = extract(sql).unwrap();
    let joins = clauses.get(ClauseKind::Join);
    assert_eq!(joins.len(), 3);
    assert!(joins[0].starts_with("INNER JOIN t2"));
    assert!(joins[1].starts_with("LEFT OUTER JOIN t3"));
    assert!(joins[2].starts_with("CROSS JOIN t4"));
}

#[test]
fn test_cte_prefix_tolerated() {
    // CTE bodies are not decomposed; the outer query still slices.
    let sql = "WITH recent AS (SELECT * FROM orders WHERE o_date > '2024-01-01') \
               SELECT id FROM recent LIMIT 5";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::Limit), ["5"]);
    assert!(clauses
        .get(ClauseKind::From)
        .iter()
        .any(|f| f.contains("recent")));
}

#[test]
fn test_non_ascii_identifiers() {
    // Identifiers with multi-byte characters must slice cleanly, including
    // ones whose prefix looks like a keyword.
    let sql = "SELECT selecé, größe FROM ciudades WHERE región = 'Málaga'";
    let clauses = extract(sql).unwrap();
    assert_eq!(clauses.get(ClauseKind::Select), ["selecé, größe"]);
    assert_eq!(clauses.get(ClauseKind::From), ["ciudades"]);
    assert_eq!(clauses.get(ClauseKind::Where), ["región = 'Málaga'"]);
}
