//! CSV writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use calculus_core::{CellValue, Workbook};

use crate::error::{CsvError, CsvResult};
use crate::options::CsvOptions;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write the active sheet of a workbook to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        workbook: &Workbook,
        path: P,
        options: &CsvOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file, options)
    }

    /// Write the active sheet of a workbook to a writer
    ///
    /// Rows and cells are emitted in index order. Gaps are padded with line breaks
    /// and delimiters so every value lands at its original position; there is no
    /// trailing line break.
    pub fn write<W: Write>(workbook: &Workbook, writer: W, options: &CsvOptions) -> CsvResult<()> {
        let sheet = workbook.active_sheet().ok_or(CsvError::NoSheet)?;

        let delimiter = options.delimiter as char;
        let mut out = BufWriter::new(writer);
        let mut line = 0u32;

        for (r, row) in sheet.rows().stable_iter() {
            while line < r {
                out.write_all(b"\n")?;
                line += 1;
            }

            let mut text = String::new();
            let mut column = 0u32;
            for (c, cell) in row.stable_iter() {
                while column < c {
                    text.push(delimiter);
                    column += 1;
                }
                text.push_str(&quote_value(cell.value(), options));
            }
            out.write_all(text.as_bytes())?;
        }

        out.flush()?;
        Ok(())
    }
}

/// Render a value, escaping and enclosing it when needed
///
/// Enclosures and delimiters inside the value are prefixed with the escape
/// character. A value that needed escaping, already holds the escape character
/// or contains whitespace is wrapped in enclosures.
fn quote_value(value: &CellValue, options: &CsvOptions) -> String {
    let enclosure = options.enclosure as char;
    let delimiter = options.delimiter as char;
    let escape = options.escape as char;

    let mut text = value.to_text();
    let mut enclose = false;

    if text.contains(enclosure) {
        text = text.replace(enclosure, &format!("{}{}", escape, enclosure));
        enclose = true;
    }
    if text.contains(delimiter) {
        text = text.replace(delimiter, &format!("{}{}", escape, delimiter));
        enclose = true;
    }
    // The escape character itself is left as is
    if text.contains(escape) {
        enclose = true;
    }

    if enclose || text.chars().any(char::is_whitespace) {
        format!("{}{}{}", enclosure, text, enclosure)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(value: &str) -> String {
        quote_value(&CellValue::string(value), &CsvOptions::default())
    }

    #[test]
    fn test_plain_values_are_bare() {
        assert_eq!(quote("Hello"), "Hello");
        assert_eq!(quote(""), "");
        assert_eq!(
            quote_value(&CellValue::Float(3.1415926535), &CsvOptions::default()),
            "3.1415926535"
        );
    }

    #[test]
    fn test_whitespace_is_enclosed() {
        assert_eq!(quote("Hi there!"), "\"Hi there!\"");
        assert_eq!(quote("tab\there"), "\"tab\there\"");
        assert_eq!(quote("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(quote("a,b"), "\"a\\,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("back\\slash"), "\"back\\slash\"");
    }

    #[test]
    fn test_no_sheet() {
        let mut out = Vec::new();
        let result = CsvWriter::write(&Workbook::new(), &mut out, &CsvOptions::default());
        assert!(matches!(result, Err(CsvError::NoSheet)));
        assert!(out.is_empty());
    }
}
