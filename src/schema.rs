//! Destination schema derivation.
//!
//! The rule is positional and ignores cell contents: the first [`WIDE_COLUMN_COUNT`] columns are
//! [`ColumnType::WideText`], every later column is [`ColumnType::NarrowText`]. All data lands as
//! text.

use crate::types::{ColumnSpec, ColumnType, TableSchema, TabularData};

/// Number of leading columns stored as wide text.
pub const WIDE_COLUMN_COUNT: usize = 4;

/// Derive a [`TableSchema`] from ordered column names.
///
/// Any column count is accepted, including zero.
///
/// ```rust
/// use sheet_loader::schema::derive_schema;
/// use sheet_loader::types::ColumnType;
///
/// let schema = derive_schema(["id", "name", "dept", "role", "level"]);
/// assert_eq!(schema.len(), 5);
/// assert_eq!(schema.columns[3].column_type, ColumnType::WideText);
/// assert_eq!(schema.columns[4].column_type, ColumnType::NarrowText);
/// ```
pub fn derive_schema<I, S>(columns: I) -> TableSchema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns = columns
        .into_iter()
        .enumerate()
        .map(|(idx, name)| ColumnSpec::new(name, column_type_at(idx)))
        .collect();
    TableSchema::new(columns)
}

/// Derive the schema for a decoded table.
pub fn derive_for(data: &TabularData) -> TableSchema {
    derive_schema(data.columns.iter().cloned())
}

/// Storage type for the column at 0-based position `idx`.
pub fn column_type_at(idx: usize) -> ColumnType {
    if idx < WIDE_COLUMN_COUNT {
        ColumnType::WideText
    } else {
        ColumnType::NarrowText
    }
}
