//! # calculus-xlsx
//!
//! XLSX (Office Open XML) file format support for calculus.
//!
//! Cell values, row metadata, sheet visibility, fonts, number formats and
//! document properties are read and written. Formulas are carried as opaque
//! text next to their cached value and are never evaluated.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calculus_core::Workbook;
//! use calculus_xlsx::{XlsxReader, XlsxWriter};
//!
//! let workbook = XlsxReader::read_file("input.xlsx").unwrap();
//! XlsxWriter::write_file(&workbook, "output.xlsx").unwrap();
//! ```

mod error;
mod reader;
mod styles;
mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
