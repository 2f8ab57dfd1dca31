#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto};

use crate::error::{ReadError, ReadResult};
use crate::types::{TabularData, Value};

use super::column_name_or_unnamed;
use super::unified::{SourceFormat, TabularDecoder};

/// Read the first worksheet of a workbook into an in-memory [`TabularData`].
///
/// Behavior:
/// - Uses the first sheet in workbook order
/// - The first row of the sheet's used range is the header row
/// - Empty header cells are named `Unnamed: <index>` (0-based column index)
/// - Remaining rows keep their cell types (int/float/bool/text); empty cells become `Null`
pub fn read_excel_from_path(path: impl AsRef<Path>) -> ReadResult<TabularData> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReadError::NoWorksheet)??;
    read_sheet_range(&range)
}

/// Convert an already-loaded worksheet range. An empty range yields an empty table.
pub fn read_sheet_range(range: &Range<Data>) -> ReadResult<TabularData> {
    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(TabularData::default());
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(idx, cell))
        .collect();
    let width = columns.len();

    let rows: Vec<Vec<Value>> = sheet_rows
        .map(|row| {
            let mut out: Vec<Value> = row.iter().map(convert_cell).collect();
            out.resize(width, Value::Null);
            out
        })
        .collect();

    TabularData::try_new(columns, rows)
}

fn header_name(idx: usize, c: &Data) -> String {
    let name = match c {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => convert_cell(other).to_text().unwrap_or_default(),
    };
    column_name_or_unnamed(idx, name)
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) => Value::Utf8(datetime_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}

/// `2024-01-15 00:00:00` for dates, ISO 8601 for durations; the raw serial if out of range.
fn datetime_text(dt: &ExcelDateTime) -> String {
    let converted = if dt.is_duration() {
        dt.as_duration().map(|d| d.to_string())
    } else {
        dt.as_datetime().map(|d| d.to_string())
    };
    converted.unwrap_or_else(|| dt.to_string())
}

/// [`TabularDecoder`] for [`SourceFormat::Spreadsheet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxDecoder;

impl TabularDecoder for XlsxDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn decode(&self, path: &Path) -> ReadResult<TabularData> {
        read_excel_from_path(path)
    }
}
