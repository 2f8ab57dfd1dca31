//! Unified reading entrypoint.
//!
//! Most callers should use [`read_from_path`], which decodes a file into an in-memory
//! [`crate::types::TabularData`]:
//!
//! - If [`ReadOptions::format`] is `None`, the format is inferred from the file extension.
//! - The format selects a decoder from a [`DecoderRegistry`]; the default registry knows
//!   `.csv` (`;`-delimited, UTF-8) and, with the `excel` feature, `.xlsx`.

use std::fmt;
use std::path::Path;

use crate::error::{ImportError, ImportResult, ReadResult};
use crate::types::TabularData;

use super::csv::{CsvDecoder, CsvOptions};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Delimited text (`.csv`).
    DelimitedText,
    /// Spreadsheet workbook (`.xlsx`, feature-gated behind `excel`).
    Spreadsheet,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::DelimitedText),
            "xlsx" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    ///
    /// Fails with [`ImportError::UnsupportedFormat`] when the path has no extension or an
    /// extension no decoder understands.
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ImportError::UnsupportedFormat {
                path: path.to_path_buf(),
                message: "path has no extension (expected .csv or .xlsx)".to_string(),
            })?;

        Self::from_extension(ext).ok_or_else(|| ImportError::UnsupportedFormat {
            path: path.to_path_buf(),
            message: format!("extension '.{ext}' is not supported (expected .csv or .xlsx)"),
        })
    }
}

/// A decoder for one [`SourceFormat`].
pub trait TabularDecoder: Send + Sync {
    /// Format this decoder handles.
    fn format(&self) -> SourceFormat;

    /// Decode the file at `path`.
    fn decode(&self, path: &Path) -> ReadResult<TabularData>;
}

/// Table of decoders, at most one per [`SourceFormat`].
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn TabularDecoder>>,
}

impl DecoderRegistry {
    /// A registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// The built-in decoders, with the delimited-text decoder using `csv`.
    pub fn with_defaults(csv: CsvOptions) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(CsvDecoder::new(csv)));
        #[cfg(feature = "excel")]
        registry.register(Box::new(super::excel::XlsxDecoder));
        registry
    }

    /// Register `decoder`, replacing any decoder previously registered for the same format.
    pub fn register(&mut self, decoder: Box<dyn TabularDecoder>) {
        let format = decoder.format();
        self.decoders.retain(|d| d.format() != format);
        self.decoders.push(decoder);
    }

    /// Decoder registered for `format`, if any.
    pub fn get(&self, format: SourceFormat) -> Option<&dyn TabularDecoder> {
        self.decoders
            .iter()
            .find(|d| d.format() == format)
            .map(|d| d.as_ref())
    }

    /// Decode `path` with the decoder registered for `format`.
    pub fn decode(&self, path: &Path, format: SourceFormat) -> ImportResult<TabularData> {
        let decoder = self
            .get(format)
            .ok_or_else(|| ImportError::UnsupportedFormat {
                path: path.to_path_buf(),
                message: unregistered_message(format),
            })?;

        decoder.decode(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn unregistered_message(format: SourceFormat) -> String {
    match format {
        SourceFormat::Spreadsheet if cfg!(not(feature = "excel")) => {
            "xlsx reading not enabled (enable cargo feature 'excel')".to_string()
        }
        other => format!("no decoder registered for {other:?}"),
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_defaults(CsvOptions::default())
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field(
                "formats",
                &self.decoders.iter().map(|d| d.format()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Options controlling unified reading.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<SourceFormat>,
    /// Delimited-text options.
    pub csv: CsvOptions,
}

impl ReadOptions {
    /// Resolve the format for `path`: the forced format if set, else the extension.
    pub fn resolve_format(&self, path: &Path) -> ImportResult<SourceFormat> {
        match self.format {
            Some(f) => Ok(f),
            None => SourceFormat::from_path(path),
        }
    }
}

/// Unified read entry point for path-based sources.
///
/// # Examples
///
/// ```no_run
/// use sheet_loader::ingestion::{read_from_path, ReadOptions};
///
/// # fn main() -> Result<(), sheet_loader::ImportError> {
/// // Uses `.csv` to select the `;`-delimited text decoder.
/// let data = read_from_path("staff.csv", &ReadOptions::default())?;
/// println!("columns={} rows={}", data.column_count(), data.row_count());
/// # Ok(())
/// # }
/// ```
pub fn read_from_path(path: impl AsRef<Path>, options: &ReadOptions) -> ImportResult<TabularData> {
    let path = path.as_ref();
    let format = options.resolve_format(path)?;
    DecoderRegistry::with_defaults(options.csv).decode(path, format)
}
