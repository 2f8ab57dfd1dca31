//! Delimited-text decoding.

use std::io::Read;
use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::types::{TabularData, Value};

use super::column_name_or_unnamed;
use super::unified::{SourceFormat, TabularDecoder};

/// Field delimiter used when none is configured.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Options for the delimited-text decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Single-byte field delimiter.
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Read a delimited-text file into an in-memory [`TabularData`].
///
/// Rules:
///
/// - The file must be UTF-8; a leading byte-order mark is stripped.
/// - The first record is the header row and supplies the column names; a blank header cell
///   is named `Unnamed: <index>` (0-based).
/// - Every data record must have as many fields as the header.
/// - Empty fields become [`Value::Null`]; everything else is kept verbatim as [`Value::Utf8`].
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> ReadResult<TabularData> {
    let bytes = std::fs::read(path)?;
    read_csv_from_bytes(&bytes, options)
}

/// Read delimited text from an in-memory buffer.
pub fn read_csv_from_bytes(bytes: &[u8], options: &CsvOptions) -> ReadResult<TabularData> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(ReadError::Encoding);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(text.as_bytes());
    read_csv_from_reader(&mut rdr)
}

/// Read delimited text from an existing CSV reader (configured by the caller).
pub fn read_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> ReadResult<TabularData> {
    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| column_name_or_unnamed(idx, name.to_owned()))
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(field_to_value).collect());
    }

    TabularData::try_new(columns, rows)
}

fn field_to_value(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        Value::Utf8(raw.to_owned())
    }
}

/// [`TabularDecoder`] for [`SourceFormat::DelimitedText`].
#[derive(Debug, Clone, Default)]
pub struct CsvDecoder {
    options: CsvOptions,
}

impl CsvDecoder {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }
}

impl TabularDecoder for CsvDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::DelimitedText
    }

    fn decode(&self, path: &Path) -> ReadResult<TabularData> {
        read_csv_from_path(path, &self.options)
    }
}
