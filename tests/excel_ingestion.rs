#![cfg(feature = "excel_test_writer")]

use std::path::Path;

use sheet_loader::ingestion::excel::read_excel_from_path;
use sheet_loader::types::Value;
use tempfile::TempDir;

fn write_staff_xlsx(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Staff").unwrap();

    // header
    for (col, name) in ["id", "name", "dept", "role", "level"].iter().enumerate() {
        ws.write_string(0, col as u16, *name).unwrap();
    }

    // row 1: numeric id and level
    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ann").unwrap();
    ws.write_string(1, 2, "Eng").unwrap();
    ws.write_string(1, 3, "Dev").unwrap();
    ws.write_number(1, 4, 3.5).unwrap();

    // row 2: bool and a gap
    ws.write_number(2, 0, 2).unwrap();
    ws.write_string(2, 1, "Bo").unwrap();
    ws.write_boolean(2, 3, true).unwrap();
    ws.write_number(2, 4, 1).unwrap();

    // A second sheet that must be ignored.
    let other = wb.add_worksheet();
    other.set_name("Ignored").unwrap();
    other.write_string(0, 0, "x").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn read_excel_first_sheet_happy_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staff.xlsx");
    write_staff_xlsx(&path);

    let data = read_excel_from_path(&path).unwrap();
    assert_eq!(data.columns, vec!["id", "name", "dept", "role", "level"]);
    assert_eq!(data.row_count(), 2);
    assert_eq!(data.rows[0][1], Value::Utf8("Ann".to_string()));
    assert_eq!(data.rows[1][2], Value::Null);
    assert_eq!(data.rows[1][3], Value::Bool(true));
}

#[test]
fn read_excel_numbers_stringify_like_the_sheet_shows_them() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staff.xlsx");
    write_staff_xlsx(&path);

    let data = read_excel_from_path(&path).unwrap().stringify();
    assert_eq!(data.rows[0][0], Value::Utf8("1".to_string()));
    assert_eq!(data.rows[0][4], Value::Utf8("3.5".to_string()));
    assert_eq!(data.rows[1][3], Value::Utf8("true".to_string()));
}

#[test]
fn read_excel_names_empty_header_cells() {
    use rust_xlsxwriter::Workbook;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaps.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 2, "dept").unwrap();
    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ann").unwrap();
    ws.write_string(1, 2, "Eng").unwrap();
    wb.save(&path).unwrap();

    let data = read_excel_from_path(&path).unwrap();
    assert_eq!(data.columns, vec!["id", "Unnamed: 1", "dept"]);
    assert_eq!(data.rows[0][1], Value::Utf8("Ann".to_string()));
}

#[test]
fn read_excel_empty_sheet_yields_empty_table() {
    use rust_xlsxwriter::Workbook;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");
    let mut wb = Workbook::new();
    wb.add_worksheet();
    wb.save(&path).unwrap();

    let data = read_excel_from_path(&path).unwrap();
    assert_eq!(data.column_count(), 0);
    assert_eq!(data.row_count(), 0);
}

#[test]
fn read_excel_rejects_duplicate_headers() {
    use rust_xlsxwriter::Workbook;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dups.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "id").unwrap();
    wb.save(&path).unwrap();

    let err = read_excel_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("duplicate column name 'id'"));
}

#[test]
fn read_excel_dates_render_as_datetime_text() {
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dates.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "start").unwrap();
    ws.write_string(0, 1, "stamp").unwrap();

    let date = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
    let stamp = ExcelDateTime::from_ymd(2024, 1, 15)
        .unwrap()
        .and_hms(8, 30, 0)
        .unwrap();
    ws.write_datetime_with_format(1, 0, &date, &Format::new().set_num_format("yyyy-mm-dd"))
        .unwrap();
    ws.write_datetime_with_format(1, 1, &stamp, &Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"))
        .unwrap();
    wb.save(&path).unwrap();

    let data = read_excel_from_path(&path).unwrap().stringify();
    assert_eq!(data.rows[0][0], Value::Utf8("2024-01-15 00:00:00".to_string()));
    assert_eq!(data.rows[0][1], Value::Utf8("2024-01-15 08:30:00".to_string()));
}
