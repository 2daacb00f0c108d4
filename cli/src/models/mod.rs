//! Domain models for the keeprow pipeline.
//!
//! - [`Schema`] - Ordered input header with name lookup
//! - [`BusinessRecord`] - One input row, immutable once read
//! - [`Decision`] - The derived "Keep row" flag for a record

use serde::Serialize;
use std::collections::HashMap;

/// Default name of the appended output column.
pub const KEEP_COLUMN: &str = "Keep row";

// =============================================================================
// Schema
// =============================================================================

/// Ordered column names of an input file.
///
/// When a header name repeats, lookups resolve to its first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    headers: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { headers, index }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Position of a column by exact name.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

// =============================================================================
// Business Record
// =============================================================================

/// One row of the input CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRecord {
    position: usize,
    values: Vec<String>,
}

impl BusinessRecord {
    /// `position` is the 0-based data row index (header excluded).
    pub fn new(position: usize, values: Vec<String>) -> Self {
        Self { position, values }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at a column index.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Value of a named column.
    pub fn get(&self, schema: &Schema, column: &str) -> Option<&str> {
        schema.position(column).and_then(|i| self.value(i))
    }

    /// Human-readable identity: the id column when set and non-empty,
    /// otherwise the row position.
    pub fn identity(&self, schema: &Schema, id_column: Option<&str>) -> String {
        id_column
            .and_then(|col| self.get(schema, col))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {}", self.position))
    }
}

// =============================================================================
// Decision
// =============================================================================

/// The "Keep row" flag derived for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub position: usize,
    pub keep: bool,
}

impl Decision {
    pub fn new(position: usize, keep: bool) -> Self {
        Self { position, keep }
    }

    /// Output rendering: exactly `True` or `False`.
    pub fn as_str(&self) -> &'static str {
        if self.keep {
            "True"
        } else {
            "False"
        }
    }
}
