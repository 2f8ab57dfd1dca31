use sheet_loader::ReadError;
use sheet_loader::ingestion::csv::{CsvOptions, read_csv_from_bytes, read_csv_from_path, read_csv_from_reader};
use sheet_loader::types::Value;

fn text(s: &str) -> Value {
    Value::Utf8(s.to_string())
}

#[test]
fn read_csv_from_path_happy_path() {
    let data = read_csv_from_path("tests/fixtures/staff.csv", &CsvOptions::default()).unwrap();

    assert_eq!(data.columns, vec!["id", "name", "dept", "role", "level"]);
    assert_eq!(data.row_count(), 2);
    assert_eq!(
        data.rows[0],
        vec![text("1"), text("Ann"), text("Eng"), text("Dev"), text("3")]
    );
    // Empty field -> Null.
    assert_eq!(data.rows[1][3], Value::Null);
}

#[test]
fn read_csv_strips_byte_order_mark() {
    let data = read_csv_from_path("tests/fixtures/staff_bom.csv", &CsvOptions::default()).unwrap();
    assert_eq!(data.columns[0], "id");
    assert_eq!(data.rows[0][0], text("1"));
}

#[test]
fn read_csv_keeps_fields_verbatim() {
    let input = "code;label\n 007 ;a,b\n";
    let data = read_csv_from_bytes(input.as_bytes(), &CsvOptions::default()).unwrap();
    assert_eq!(data.rows[0], vec![text(" 007 "), text("a,b")]);
}

#[test]
fn read_csv_header_only_has_no_rows() {
    let data = read_csv_from_path("tests/fixtures/header_only.csv", &CsvOptions::default()).unwrap();
    assert_eq!(data.column_count(), 6);
    assert_eq!(data.row_count(), 0);
}

#[test]
fn read_csv_honours_custom_delimiter() {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_reader("id,name\n1,Ann\n".as_bytes());

    let data = read_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(data.columns, vec!["id", "name"]);
    assert_eq!(data.rows[0][1], text("Ann"));

    let data = read_csv_from_bytes(b"a|b\n1|2\n", &CsvOptions { delimiter: b'|' }).unwrap();
    assert_eq!(data.rows[0], vec![text("1"), text("2")]);
}

#[test]
fn read_csv_errors_on_ragged_row() {
    let err = read_csv_from_path("tests/fixtures/ragged.csv", &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ReadError::Csv(_)));
    assert!(err.to_string().starts_with("csv error"));
}

#[test]
fn read_csv_errors_on_duplicate_header() {
    let err = read_csv_from_path("tests/fixtures/duplicate_header.csv", &CsvOptions::default()).unwrap_err();
    assert!(err.to_string().contains("duplicate column name 'id'"));
}

#[test]
fn read_csv_errors_on_invalid_utf8() {
    let err = read_csv_from_path("tests/fixtures/latin1.csv", &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ReadError::Encoding));
}

#[test]
fn read_csv_errors_on_missing_file() {
    let err = read_csv_from_path("tests/fixtures/does_not_exist.csv", &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ReadError::Io(_)));
}

#[test]
fn read_csv_names_blank_header_fields() {
    let data = read_csv_from_path("tests/fixtures/trailing_header.csv", &CsvOptions::default()).unwrap();
    assert_eq!(data.columns, vec!["id", "name", "Unnamed: 2"]);
    assert_eq!(data.rows[0][2], Value::Null);
    assert_eq!(data.rows[1][2], text("x"));
}
