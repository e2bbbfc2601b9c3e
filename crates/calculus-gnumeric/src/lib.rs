//! # calculus-gnumeric
//!
//! Reader and writer for GNumeric workbooks: gzip-compressed XML in the
//! `http://www.gnumeric.org/v10.dtd` namespace. Uncompressed documents are
//! read as well.
//!
//! ## Example
//!
//! ```no_run
//! use calculus_core::Workbook;
//! use calculus_gnumeric::{GnumericReader, GnumericWriter};
//!
//! let mut workbook = Workbook::new();
//! workbook.add_sheet("Sheet1").unwrap().set_value(0, 0, "One");
//! GnumericWriter::write_file(&workbook, "out.gnumeric").unwrap();
//!
//! let workbook = GnumericReader::read_file("out.gnumeric").unwrap();
//! assert_eq!(workbook.sheet_count(), 1);
//! ```

mod error;
mod reader;
mod value_type;
mod writer;

pub use error::{GnumericError, GnumericResult};
pub use reader::GnumericReader;
pub use value_type::ValueType;
pub use writer::GnumericWriter;

/// XML namespace of GNumeric documents
pub const NAMESPACE: &str = "http://www.gnumeric.org/v10.dtd";
