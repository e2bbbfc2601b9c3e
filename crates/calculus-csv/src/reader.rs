//! CSV reader

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use calculus_core::chrono::{NaiveDate, NaiveDateTime};
use calculus_core::{duration, CellValue, Workbook};

use crate::error::{CsvError, CsvResult};
use crate::options::{CsvHint, CsvOptions};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a workbook
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvOptions) -> CsvResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a workbook with a single `Sheet1`
    ///
    /// Input is consumed line by line:
    /// - lines starting with the comment prefix are dropped and do not take a row
    /// - blank lines take a row but store nothing
    /// - empty fields take a column but store nothing
    pub fn read<R: Read>(reader: R, options: &CsvOptions) -> CsvResult<Workbook> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Sheet1")?;

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .quote(options.enclosure)
            .escape(Some(options.escape));

        let comment = options.comment.as_deref().filter(|c| !c.is_empty());
        let mut input = BufReader::new(reader);
        let mut line = Vec::new();
        let mut row = 0u32;

        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            if let Some(prefix) = comment {
                if line.starts_with(prefix.as_bytes()) {
                    continue;
                }
            }

            let content = trim_line_end(&line);
            if content.is_empty() {
                row += 1;
                continue;
            }

            let mut record = csv::StringRecord::new();
            builder.from_reader(content).read_record(&mut record)?;

            for (column, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                let value = match options.hints.get(column) {
                    Some(hint) => convert(field, *hint).map_err(|message| CsvError::Parse {
                        row: row as usize,
                        column,
                        message,
                    })?,
                    None => CellValue::string(field),
                };
                sheet.set_value(row, column as u32, value);
            }

            row += 1;
        }

        log::debug!("read {} CSV rows", row);
        Ok(workbook)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Convert a field to the hinted type
fn convert(field: &str, hint: CsvHint) -> Result<CellValue, String> {
    match hint {
        CsvHint::String => Ok(CellValue::string(field)),
        CsvHint::Boolean => parse_bool(field)
            .map(CellValue::Boolean)
            .ok_or_else(|| format!("Failed to read CSV boolean value: {:?}", field)),
        CsvHint::Integer => field
            .parse::<i64>()
            .map(CellValue::Integer)
            .map_err(|e| format!("Failed to read CSV integer value: {:?}: {}", field, e)),
        CsvHint::Float => field
            .parse::<f64>()
            .map(CellValue::Float)
            .map_err(|e| format!("Failed to read CSV floating point value: {:?}: {}", field, e)),
        CsvHint::Date => parse_date(field)
            .map(CellValue::from)
            .map_err(|e| format!("Failed to parse value as date: {:?}: {}", field, e)),
        CsvHint::Duration => duration::parse(field)
            .map(CellValue::Duration)
            .map_err(|e| format!("Failed to read CSV duration value: {}", e)),
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_date(field: &str) -> Result<NaiveDateTime, calculus_core::chrono::ParseError> {
    if field.len() > 10 {
        NaiveDateTime::parse_from_str(field, "%Y-%m-%dT%H:%M:%S%.f")
    } else {
        NaiveDate::parse_from_str(field, "%Y-%m-%d").map(NaiveDateTime::from)
    }
}
