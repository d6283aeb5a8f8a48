//! Result-table data model
//!
//! The executor capability returns query results as a [`Table`]: an ordered
//! sequence of named columns plus rows of scalar cells. The engine places no
//! constraint on where the data came from.

use serde::{Deserialize, Serialize};

/// A single scalar result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellValue {
    /// SQL NULL
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
}

impl CellValue {
    /// Numeric view of the cell, coercing integers to floats.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// A query result: named columns and rows of scalar cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows of cells, one cell per column
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Integer(30).as_numeric(), Some(30.0));
        assert_eq!(CellValue::Float(30.5).as_numeric(), Some(30.5));
        assert_eq!(CellValue::String("30".to_string()).as_numeric(), None);
        assert_eq!(CellValue::Null.as_numeric(), None);
    }
}
