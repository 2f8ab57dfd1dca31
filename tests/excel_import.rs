#![cfg(feature = "excel_test_writer")]

use std::path::Path;

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sheet_loader::ImportError;
use sheet_loader::config::ConnectionConfig;
use sheet_loader::loading::{Session, connect};
use sheet_loader::pipeline::{ImportOptions, ImportRequest, import_into_session, run_import};
use tempfile::TempDir;

/// `id | name | dept | started | level`, two data rows.
fn write_roster(path: &Path, level: &str) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (col, name) in ["id", "name", "dept", "started", "level"].iter().enumerate() {
        ws.write_string(0, col as u16, *name).unwrap();
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let started = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();

    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ann").unwrap();
    ws.write_string(1, 2, "Eng").unwrap();
    ws.write_datetime_with_format(1, 3, &started, &date_format)
        .unwrap();
    ws.write_string(1, 4, level).unwrap();

    ws.write_number(2, 0, 2.5).unwrap();
    ws.write_string(2, 1, "Bo").unwrap();
    ws.write_number(2, 4, 7).unwrap();

    wb.save(path).unwrap();
}

type Row = (String, String, Option<String>, Option<String>, String);

fn fetch_rows(session: &Session, table: &str) -> Vec<Row> {
    let mut stmt = session
        .connection()
        .prepare(&format!("SELECT * FROM {table} ORDER BY id"))
        .unwrap();
    stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn xlsx_import_stores_stringified_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.xlsx");
    write_roster(&path, "A");

    let mut session = Session::open_in_memory().unwrap();
    let report = import_into_session(
        &mut session,
        &ImportRequest::new(&path, "roster"),
        &ImportOptions::default(),
    )
    .unwrap();
    assert_eq!(report.columns, 5);
    assert_eq!(report.rows, 2);

    let rows = fetch_rows(&session, "roster");
    assert_eq!(
        rows[0],
        (
            "1".to_string(),
            "Ann".to_string(),
            Some("Eng".to_string()),
            Some("2024-01-15 00:00:00".to_string()),
            "A".to_string()
        )
    );
    assert_eq!(
        rows[1],
        ("2.5".to_string(), "Bo".to_string(), None, None, "7".to_string())
    );
}

#[test]
fn xlsx_run_import_into_duckdb_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.xlsx");
    write_roster(&path, "A");
    let db = dir.path().join("warehouse.duckdb");
    let config = ConnectionConfig::duckdb(db.to_str().unwrap());

    run_import(&ImportRequest::new(&path, "Personalplan_Import"), &config, &ImportOptions::default())
        .unwrap();

    let session = connect(&config).unwrap();
    let count: i64 = session
        .connection()
        .query_row("SELECT count(*) FROM \"Personalplan_Import\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn xlsx_over_width_cell_rolls_back() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.xlsx");
    let wide = dir.path().join("wide.xlsx");
    write_roster(&good, "A");
    write_roster(&wide, "far too wide for nine");

    let mut session = Session::open_in_memory().unwrap();
    import_into_session(&mut session, &ImportRequest::new(&good, "roster"), &ImportOptions::default())
        .unwrap();

    let err = import_into_session(&mut session, &ImportRequest::new(&wide, "roster"), &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, ImportError::Insert { row: 1, .. }));

    let rows = fetch_rows(&session, "roster");
    assert_eq!(rows[0].4, "A");
}
