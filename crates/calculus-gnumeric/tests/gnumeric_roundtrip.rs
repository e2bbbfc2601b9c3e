//! Writing workbooks to GNumeric and reading them back

use std::io::Read;

use calculus_core::chrono::{Duration, TimeZone, Utc};
use calculus_core::{CellValue, SheetState, Workbook};
use calculus_gnumeric::{GnumericReader, GnumericWriter};
use flate2::read::GzDecoder;
use pretty_assertions::assert_eq;

fn write_to_bytes(workbook: &Workbook) -> Vec<u8> {
    let mut buf = Vec::new();
    GnumericWriter::write(workbook, &mut buf).unwrap();
    buf
}

fn decompress(bytes: &[u8]) -> String {
    let mut xml = String::new();
    GzDecoder::new(bytes).read_to_string(&mut xml).unwrap();
    xml
}

fn various_types() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("TestSheet1").unwrap();
    sheet.set_value(0, 0, "One");
    sheet.set_value(0, 1, "Two");
    sheet.set_value(0, 2, "Three");
    sheet.set_value(1, 0, 3.1415926535);
    sheet.set_value(3, 0, true);
    sheet.set_value(3, 1, false);
    sheet.set_value(4, 0, Utc.with_ymd_and_hms(2019, 8, 13, 12, 13, 14).unwrap());
    workbook
}

#[test]
fn test_empty_workbook_writes() {
    let bytes = write_to_bytes(&Workbook::new());
    assert!(!bytes.is_empty());

    let xml = decompress(&bytes);
    assert!(xml.contains("<Sheets>\n  </Sheets>"));

    let read = GnumericReader::read(bytes.as_slice()).unwrap();
    assert!(read.is_empty());
}

#[test]
fn test_various_types_composition() {
    let bytes = write_to_bytes(&various_types());
    let xml = decompress(&bytes);

    for expected in [
        "Name>TestSheet1</Name>",
        ">One</Cell>",
        ">Two</Cell>",
        ">3.1415926535</Cell>",
        ">TRUE</Cell>",
        ">FALSE</Cell>",
        ">43690.50918981482</Cell>",
    ] {
        assert!(xml.contains(expected), "missing {}", expected);
    }
    assert!(xml.contains(r#"<Geometry Width="734" Height="422"/>"#));
    assert!(xml.contains(r#"<Cols DefaultSizePts="48"/>"#));
    assert!(xml.contains(r#"<SheetLayout TopLeft="A1"/>"#));
}

#[test]
fn test_roundtrip() {
    let mut workbook = various_types();
    workbook.properties_mut().title = "Types".to_string();
    workbook.properties_mut().category = "Tests".to_string();
    workbook.show_horizontal_scroll = false;
    {
        let sheet = workbook.sheet_mut("TestSheet1").unwrap();
        sheet.set_value(5, 0, 12);
        sheet.set_value(5, 1, Duration::hours(30));
        sheet.set_value(5, 2, CellValue::error("#N/A"));
        sheet.set_value(6, 0, "  spaced & <tagged>  ");
        sheet.set_row_height(1, 18.5);
        sheet.set_row_hidden(3, true);
    }
    let hidden = workbook.add_sheet("Later").unwrap();
    hidden.set_state(SheetState::VeryHidden);
    hidden.set_value(0, 0, 1.5).set_comment(Some("one and a half"));
    workbook.set_active("TestSheet1");

    let read = GnumericReader::read(write_to_bytes(&workbook).as_slice()).unwrap();

    assert_eq!(read.sheet_count(), 2);
    assert_eq!(read.active_sheet().map(|s| s.name()), Some("TestSheet1"));
    assert!(!read.show_horizontal_scroll);
    assert!(read.show_sheet_tabs);
    assert_eq!(read.properties().title, "Types");
    assert_eq!(read.properties().category, "Tests");

    let sheet = read.sheet("TestSheet1").unwrap();
    assert_eq!(sheet.value(0, 2), Some(&CellValue::string("Three")));
    assert_eq!(sheet.value(1, 0), Some(&CellValue::Float(3.1415926535)));
    assert_eq!(sheet.value(3, 1), Some(&CellValue::Boolean(false)));
    assert_eq!(
        sheet.value(4, 0),
        Some(&CellValue::Date(Utc.with_ymd_and_hms(2019, 8, 13, 12, 13, 14).unwrap()))
    );
    assert_eq!(sheet.value(5, 0), Some(&CellValue::Integer(12)));
    assert_eq!(sheet.value(5, 1), Some(&CellValue::Duration(Duration::hours(30))));
    assert_eq!(sheet.value(5, 2), Some(&CellValue::error("#N/A")));
    assert_eq!(sheet.value(6, 0), Some(&CellValue::string("  spaced & <tagged>  ")));
    assert_eq!(sheet.row_height(1), 18.5);
    assert!(sheet.is_row_hidden(3));
    assert_eq!(sheet.row_height(3), 0.0);

    let later = read.sheet("Later").unwrap();
    assert_eq!(later.state(), SheetState::VeryHidden);
    assert_eq!(later.cell(0, 0).and_then(|c| c.comment()), Some("one and a half"));
}

#[test]
fn test_date1904_roundtrip() {
    let mut workbook = Workbook::new();
    workbook.properties_mut().date1904 = true;
    let when = Utc.with_ymd_and_hms(1904, 1, 3, 0, 0, 0).unwrap();
    workbook.add_sheet("Dates").unwrap().set_value(0, 0, when);

    let bytes = write_to_bytes(&workbook);
    let xml = decompress(&bytes);
    assert!(xml.contains(r#"<Calculation DateConvention="Apple:1904"/>"#));
    assert!(xml.contains(">2</Cell>"));

    let read = GnumericReader::read(bytes.as_slice()).unwrap();
    assert!(read.properties().date1904);
    assert_eq!(read.sheet("Dates").unwrap().value(0, 0), Some(&CellValue::Date(when)));
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.gnumeric");

    GnumericWriter::write_file(&various_types(), &path).unwrap();
    let workbook = GnumericReader::read_file(&path).unwrap();
    assert_eq!(
        workbook.sheet("TestSheet1").and_then(|s| s.value(3, 0)),
        Some(&CellValue::Boolean(true))
    );
}
