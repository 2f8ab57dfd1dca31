//! Reading entrypoints and implementations.
//!
//! Most callers should use [`read_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`ReadOptions`])
//! - decodes the file into an in-memory [`crate::types::TabularData`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (with the `excel` feature)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod unified;

pub use self::csv::{CsvDecoder, CsvOptions};
pub use unified::{DecoderRegistry, ReadOptions, SourceFormat, TabularDecoder, read_from_path};

/// Header name for column `idx`: `name`, or `Unnamed: <idx>` when the header cell is blank.
pub(crate) fn column_name_or_unnamed(idx: usize, name: String) -> String {
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name
    }
}
