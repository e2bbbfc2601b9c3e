//! CSV reading and writing against fixed inputs

use calculus_core::{CellValue, Workbook};
use calculus_csv::{CsvError, CsvHint, CsvOptions, CsvReader, CsvWriter};
use pretty_assertions::assert_eq;

fn write_to_string(workbook: &Workbook, options: &CsvOptions) -> String {
    let mut out = Vec::new();
    CsvWriter::write(workbook, &mut out, options).unwrap();
    String::from_utf8(out).unwrap()
}

fn s(text: &str) -> Option<CellValue> {
    Some(CellValue::string(text))
}

#[test]
fn test_write_simple_strings() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("TestSheet1").unwrap();
    sheet.set_value(0, 0, "Hello");
    sheet.set_value(0, 1, "World");
    sheet.set_value_by_ref("A2", "Foo");
    sheet.set_value_by_ref("B2", "Bar");
    sheet.set_value_by_ref("C2", "Baz");

    assert_eq!(
        write_to_string(&workbook, &CsvOptions::default()),
        "Hello,World\nFoo,Bar,Baz"
    );
}

#[test]
fn test_write_custom_dialect() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("TestSheet1").unwrap();
    sheet.set_value(0, 0, "Hi there!");
    sheet.set_value(1, 1, "Go ➡️");
    sheet.set_value(2, 2, "See a 🌈");
    sheet.set_value(3, 3, "No escape \\");

    let options = CsvOptions::default().with_delimiter(b';');
    assert_eq!(
        write_to_string(&workbook, &options),
        "\"Hi there!\"\n;\"Go ➡️\"\n;;\"See a 🌈\"\n;;;\"No escape \\\""
    );
}

#[test]
fn test_write_various_types() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("TestSheet1").unwrap();
    sheet.set_value(0, 0, "Zero");
    sheet.set_value(0, 0, "One");
    sheet.set_value(0, 1, "Two");
    sheet.set_value(0, 2, "Three");
    sheet.set_value(1, 0, true);
    sheet.set_value(1, 0, 2);
    sheet.set_value(1, 0, 3.1415926535);
    sheet.set_value(3, 0, true);
    sheet.set_value(3, 1, false);

    assert_eq!(
        write_to_string(&workbook, &CsvOptions::default()),
        "One,Two,Three\n3.1415926535\n\ntrue,false"
    );
}

#[test]
fn test_write_only_active_sheet() {
    let mut workbook = Workbook::new();
    workbook.add_sheet("First").unwrap().set_value(0, 0, "first");
    workbook.add_sheet("Second").unwrap().set_value(0, 0, "second");
    workbook.set_active("First");

    assert_eq!(write_to_string(&workbook, &CsvOptions::default()), "first");
}

#[test]
fn test_write_empty_workbook_fails() {
    let mut out = Vec::new();
    let result = CsvWriter::write(&Workbook::new(), &mut out, &CsvOptions::default());
    assert!(matches!(result, Err(CsvError::NoSheet)));
    assert!(out.is_empty());
}

#[test]
fn test_read_simple_strings() {
    let input = "\"First\",\"Second\",\"Third\",\"Fourth\"\n\n\nFoo,Bar,Baz,?\r\n1,2,3,4,,5";
    let workbook = CsvReader::read(input.as_bytes(), &CsvOptions::default()).unwrap();
    let sheet = workbook.active_sheet().unwrap();
    assert_eq!(sheet.name(), "Sheet1");

    let golden = [
        ("A1", "First"),
        ("B1", "Second"),
        ("C1", "Third"),
        ("D1", "Fourth"),
        ("A4", "Foo"),
        ("B4", "Bar"),
        ("C4", "Baz"),
        ("D4", "?"),
        ("A5", "1"),
        ("B5", "2"),
        ("C5", "3"),
        ("D5", "4"),
        ("F5", "5"),
    ];
    for (reference, expected) in golden {
        assert_eq!(sheet.value_by_ref(reference).cloned(), s(expected), "{}", reference);
    }
    // Blank lines and empty fields leave no cells behind
    assert_eq!(sheet.value_by_ref("A2"), None);
    assert_eq!(sheet.value_by_ref("E5"), None);
}

#[test]
fn test_read_custom_dialect() {
    let input = "💬 Nothing to do here\n1,2,3,4,5\n💬 Neither here\n5,4,3,2,1\n%All done%";
    let options = CsvOptions::default()
        .with_enclosure(b'%')
        .with_comment("💬");
    let workbook = CsvReader::read(input.as_bytes(), &options).unwrap();
    let sheet = workbook.active_sheet().unwrap();

    let golden = [
        ("A1", "1"),
        ("B1", "2"),
        ("C1", "3"),
        ("D1", "4"),
        ("E1", "5"),
        ("A2", "5"),
        ("B2", "4"),
        ("C2", "3"),
        ("D2", "2"),
        ("E2", "1"),
        ("A3", "All done"),
    ];
    for (reference, expected) in golden {
        assert_eq!(sheet.value_by_ref(reference).cloned(), s(expected), "{}", reference);
    }
}

#[test]
fn test_read_with_hints() {
    let input = "1,2.3,true,Hello\n42,-0.0002,false,World\n-99,0.12345,1,\"Foo\"";
    let options =
        CsvOptions::default().with_hints([CsvHint::Integer, CsvHint::Float, CsvHint::Boolean]);
    let workbook = CsvReader::read(input.as_bytes(), &options).unwrap();
    let sheet = workbook.active_sheet().unwrap();

    let golden = [
        ("A1", CellValue::Integer(1)),
        ("B1", CellValue::Float(2.3)),
        ("C1", CellValue::Boolean(true)),
        ("D1", CellValue::string("Hello")),
        ("A2", CellValue::Integer(42)),
        ("B2", CellValue::Float(-0.0002)),
        ("C2", CellValue::Boolean(false)),
        ("D2", CellValue::string("World")),
        ("A3", CellValue::Integer(-99)),
        ("B3", CellValue::Float(0.12345)),
        ("C3", CellValue::Boolean(true)),
        ("D3", CellValue::string("Foo")),
    ];
    for (reference, expected) in golden {
        assert_eq!(sheet.value_by_ref(reference), Some(&expected), "{}", reference);
    }
}

#[test]
fn test_read_bad_hint_reports_position() {
    let input = "1,2\n3,x";
    let options = CsvOptions::default().with_hints([CsvHint::Integer, CsvHint::Integer]);
    match CsvReader::read(input.as_bytes(), &options) {
        Err(CsvError::Parse { row, column, .. }) => assert_eq!((row, column), (1, 1)),
        other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_escaped_values_read_back() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("Quotes").unwrap();
    sheet.set_value(0, 0, "a,b");
    sheet.set_value(0, 1, "say \"hi\"");
    sheet.set_value(0, 2, "two words");

    let text = write_to_string(&workbook, &CsvOptions::default());
    let read = CsvReader::read(text.as_bytes(), &CsvOptions::default()).unwrap();
    let sheet = read.active_sheet().unwrap();
    assert_eq!(sheet.value(0, 0).cloned(), s("a,b"));
    assert_eq!(sheet.value(0, 1).cloned(), s("say \"hi\""));
    assert_eq!(sheet.value(0, 2).cloned(), s("two words"));
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("Data").unwrap();
    sheet.set_value(0, 0, "x");
    sheet.set_value(2, 1, "y");

    CsvWriter::write_file(&workbook, &path, &CsvOptions::default()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n\n,y");

    let read = CsvReader::read_file(&path, &CsvOptions::default()).unwrap();
    let sheet = read.active_sheet().unwrap();
    assert_eq!(sheet.value_by_ref("A1").cloned(), s("x"));
    assert_eq!(sheet.value_by_ref("B3").cloned(), s("y"));
}
