//! # calculus-core
//!
//! Core data structures for the calculus spreadsheet library.
//!
//! This crate provides the types every format codec builds on:
//! - [`Workbook`], [`Sheet`] - The main document structures
//! - [`Rows`], [`Row`] - The sparse cell grid
//! - [`Cell`], [`CellValue`] - Typed cell values with optional style, comment and formula
//! - [`CellAddress`] - A1-style cell addressing
//! - [`Style`], [`Font`], [`StylePool`] - Shared cell formatting
//! - [`date`] and [`duration`] - Serial date and ISO-8601 duration codecs
//!
//! ## Example
//!
//! ```rust
//! use calculus_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_sheet("Sheet1").unwrap();
//!
//! // Using row/column indices (0-based)
//! sheet.set_value(0, 0, "Hello");
//! sheet.set_value(0, 1, 42);
//!
//! // Or using string references
//! sheet.set_value_by_ref("A2", 3.14);
//!
//! assert_eq!(sheet.value_by_ref("B1"), Some(&CellValue::Integer(42)));
//! ```

pub mod cell;
pub mod date;
pub mod duration;
pub mod error;
pub mod properties;
pub mod row;
pub mod sheet;
pub mod style;
pub mod workbook;

// Re-exports for convenience
pub use cell::{format_coordinate, parse_coordinate, Cell, CellAddress, CellValue, CellValueType};
pub use error::{Error, Result};
pub use properties::Properties;
pub use row::{Row, Rows};
pub use sheet::{Sheet, SheetState};
pub use style::{Font, Style, StylePool};
pub use workbook::Workbook;

/// Re-exported so callers can build dates and durations without a direct dependency
pub use chrono;
