use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for decoding a source file.
pub type ReadResult<T> = Result<T, ReadError>;

/// Convenience result type for the import pipeline.
pub type ImportResult<T> = Result<T, ImportError>;

/// Failure while decoding a source file into [`crate::types::TabularData`].
///
/// This is a single error enum shared across the CSV and (optional) Excel decoders.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error, including data rows whose field count differs from the header.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not valid UTF-8 (after stripping an optional byte-order mark).
    #[error("encoding error: input is not valid UTF-8")]
    Encoding,

    /// Two header cells carry the same column name.
    #[error("duplicate column name '{name}' at positions {first} and {second}")]
    DuplicateColumn {
        name: String,
        first: usize,
        second: usize,
    },

    /// A row does not have exactly one cell per column.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// The workbook contains no worksheet to read.
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

/// Error type returned by the import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension does not select any registered decoder.
    #[error("unsupported format for {}: {message}", .path.display())]
    UnsupportedFormat { path: PathBuf, message: String },

    /// The source file could not be decoded.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    /// One or more mandatory connection parameters were not supplied.
    #[error("missing database configuration: {}", .missing.join(", "))]
    MissingConfig { missing: Vec<&'static str> },

    /// A connection parameter was supplied but could not be interpreted.
    #[error("invalid database configuration: {message}")]
    InvalidConfig { message: String },

    /// The database session could not be opened. Carries every driver diagnostic.
    #[error("database connection failed: {}", .messages.join("; "))]
    Connection { messages: Vec<String> },

    /// The destination table could not be replaced (invalid identifier, drop/create failure).
    #[error("schema error for table '{table}': {message}")]
    Schema { table: String, message: String },

    /// A row could not be inserted. `row` is 1-based.
    #[error("insert into '{table}' failed at row {row}: {message}")]
    Insert {
        table: String,
        row: usize,
        message: String,
    },

    /// Any other database failure (begin/commit/rollback).
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),
}
