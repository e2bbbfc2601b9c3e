//! Prelude module - common imports for calculus users
//!
//! ```rust
//! use calculus::prelude::*;
//! ```

pub use crate::{
    Cell,
    CellAddress,
    // Cell types
    CellValue,
    CellValueType,

    CsvOptions,
    CsvReader,
    CsvWriter,

    // Error types
    Error,
    Font,
    Properties,
    Result,

    Sheet,
    SheetState,
    // Style types
    Style,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,

    // I/O types
    XlsxReader,
    XlsxWriter,
};

#[cfg(feature = "ods")]
pub use crate::{OdsReader, OdsWriter};

#[cfg(feature = "gnumeric")]
pub use crate::{GnumericReader, GnumericWriter};
