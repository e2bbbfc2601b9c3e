//! # calculus-ods
//!
//! OpenDocument Spreadsheet (`.ods`) support for calculus.
//!
//! Tables, typed cell values, cell annotations, hidden rows and sheets, row
//! heights, document metadata and the active table are read and written.
//! Cell formatting is not carried.

mod error;
mod reader;
mod writer;

pub use error::{OdsError, OdsResult};
pub use reader::OdsReader;
pub use writer::OdsWriter;

/// Media type stored in the `mimetype` entry of every ODS package
pub const MIME_TYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";
