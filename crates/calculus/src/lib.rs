//! # calculus
//!
//! A Rust library for reading and writing spreadsheet documents.
//!
//! ## Features
//!
//! - Sparse workbook model with typed cell values, styles and document properties
//! - Read and write CSV files with configurable dialect and column type hints
//! - Read and write XLSX files (Office Open XML)
//! - Read and write ODS files (OpenDocument) - optional
//! - Read and write GNumeric files - optional
//!
//! ## Example
//!
//! ```rust
//! use calculus::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_sheet("Sheet1").unwrap();
//!
//! sheet.set_value_by_ref("A1", "Hello");
//! sheet.set_value_by_ref("B1", 42.0);
//! sheet.set_value_by_ref("C1", true);
//!
//! assert_eq!(sheet.value_by_ref("B1"), Some(&CellValue::Float(42.0)));
//!
//! // workbook.save("output.xlsx").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use calculus_core::{
    chrono, date, duration, format_coordinate, parse_coordinate, Cell, CellAddress, CellValue,
    CellValueType, Error, Font, Properties, Result, Row, Rows, Sheet, SheetState, Style,
    StylePool, Workbook,
};

// Re-export I/O types
pub use calculus_csv::{CsvError, CsvHint, CsvOptions, CsvReader, CsvWriter};
#[cfg(feature = "gnumeric")]
pub use calculus_gnumeric::{GnumericError, GnumericReader, GnumericWriter};
#[cfg(feature = "ods")]
pub use calculus_ods::{OdsError, OdsReader, OdsWriter};
pub use calculus_xlsx::{XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
///
/// The format is picked from the file extension: `csv`, `xlsx`, `ods` or
/// `gnumeric`. CSV files hold a single sheet; saving writes the active one.
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();

        match extension(path).as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            Some("csv") => CsvReader::read_file(path, &CsvOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            #[cfg(feature = "ods")]
            Some("ods") => OdsReader::read_file(path).map_err(|e| Error::other(e.to_string())),
            #[cfg(feature = "gnumeric")]
            Some("gnumeric") => {
                GnumericReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        match extension(path).as_deref() {
            Some("xlsx") => {
                XlsxWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            Some("csv") => CsvWriter::write_file(self, path, &CsvOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            #[cfg(feature = "ods")]
            Some("ods") => OdsWriter::write_file(self, path).map_err(|e| Error::other(e.to_string())),
            #[cfg(feature = "gnumeric")]
            Some("gnumeric") => {
                GnumericWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
