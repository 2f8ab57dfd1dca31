//! Core data model types for the import pipeline.
//!
//! A source file is decoded into [`TabularData`] (ordered column names + ordered rows of
//! [`Value`]s). The destination table is described by a [`TableSchema`], an ordered list of
//! [`ColumnSpec`]s aligned position-for-position with the source columns.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ReadError, ReadResult};

/// A single cell in [`TabularData`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty cell.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Text rendering of the cell, or `None` for [`Value::Null`].
    ///
    /// Integral floats render without a fractional part (`1.0` → `"1"`), which is how
    /// spreadsheets store plain whole numbers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int64(i) => Some(i.to_string()),
            Value::Float64(f) => Some(float_to_text(*f)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Utf8(s) => Some(s.clone()),
        }
    }

    /// Returns the text content for [`Value::Utf8`] cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn float_to_text(f: f64) -> String {
    // f64 stops representing every integer past 2^53.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// In-memory table decoded from a source file.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as [`TabularData::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularData {
    /// Ordered column names (header row).
    pub columns: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Value>>,
}

impl TabularData {
    /// Create a table from columns and rows without checking its invariants.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Create a table, rejecting duplicate column names and rows of the wrong width.
    ///
    /// Row numbers in [`ReadError::RowWidth`] are 1-based and count data rows only.
    pub fn try_new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> ReadResult<Self> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(ReadError::DuplicateColumn {
                    name: name.clone(),
                    first,
                    second: idx,
                });
            }
            seen.insert(name.as_str(), idx);
        }

        let expected = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ReadError::RowWidth {
                row: idx + 1,
                found: row.len(),
                expected,
            });
        }

        Ok(Self { columns, rows })
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Coerce every non-null cell to [`Value::Utf8`]. Nulls stay null.
    pub fn stringify(self) -> Self {
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| match v {
                        Value::Utf8(_) | Value::Null => v,
                        other => other.to_text().map_or(Value::Null, Value::Utf8),
                    })
                    .collect()
            })
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }
}

/// Storage type of a destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Fixed-width text, width [`ColumnType::WIDE_WIDTH`].
    WideText,
    /// Fixed-width text, width [`ColumnType::NARROW_WIDTH`].
    NarrowText,
}

impl ColumnType {
    /// Width of the leading (identifying) columns.
    pub const WIDE_WIDTH: usize = 50;
    /// Width of every later column.
    pub const NARROW_WIDTH: usize = 9;

    /// Declared character width.
    pub fn width(self) -> usize {
        match self {
            ColumnType::WideText => Self::WIDE_WIDTH,
            ColumnType::NarrowText => Self::NARROW_WIDTH,
        }
    }

    /// SQL type used in `CREATE TABLE`.
    pub fn sql_type(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VARCHAR({})", self.width())
    }
}

/// A single named, typed destination column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name, as read from the source header.
    pub name: String,
    /// Storage type.
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered destination columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    /// Columns in source order.
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
