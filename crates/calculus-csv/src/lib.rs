//! # calculus-csv
//!
//! CSV reader and writer for calculus.
//!
//! Reading produces a workbook with a single `Sheet1`; writing emits the active
//! sheet only.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvHint, CsvOptions};
pub use reader::CsvReader;
pub use writer::CsvWriter;
