//! Sheet type

use std::fmt;
use std::str::FromStr;

use crate::cell::{Cell, CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::row::Rows;

/// Sheet visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SheetState {
    #[default]
    Visible,
    /// Hidden, but the user can unhide it from the UI
    Hidden,
    /// Hidden and only reachable programmatically
    VeryHidden,
}

impl SheetState {
    /// Name as used by OOXML `state` attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetState::Visible => "visible",
            SheetState::Hidden => "hidden",
            SheetState::VeryHidden => "veryHidden",
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, SheetState::Visible)
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "visible" => Ok(SheetState::Visible),
            "hidden" => Ok(SheetState::Hidden),
            "veryHidden" => Ok(SheetState::VeryHidden),
            _ => Err(Error::other(format!("Unknown sheet state: {}", s))),
        }
    }
}

/// A named grid of cells
///
/// Name uniqueness is enforced by the owning [`Workbook`](crate::Workbook), not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    state: SheetState,
    rows: Rows,
}

impl Sheet {
    /// Create a new, visible, empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            state: SheetState::Visible,
            rows: Rows::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn set_state(&mut self, state: SheetState) {
        self.state = state;
    }

    /// The sparse row collection
    pub fn rows(&self) -> &Rows {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Rows {
        &mut self.rows
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows.cell(row, column)
    }

    pub fn cell_mut(&mut self, row: u32, column: u32) -> Option<&mut Cell> {
        self.rows.cell_mut(row, column)
    }

    /// Get a cell by address string (e.g., "A1")
    ///
    /// Unlike the `*_by_ref` helpers, a malformed address is reported.
    pub fn cell_by_ref(&self, reference: &str) -> Result<Option<&Cell>> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.cell(addr.row, addr.column))
    }

    /// Value stored at `(row, column)`, if a cell exists there
    pub fn value(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.cell(row, column).map(Cell::value)
    }

    /// Store a new cell holding `value`, replacing any cell at that slot
    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, column: u32, value: V) -> &mut Cell {
        self.rows.set_cell(row, column, Cell::new(value))
    }

    /// Value at an A1-style reference
    ///
    /// A malformed reference yields `None`, same as an unwritten slot.
    pub fn value_by_ref(&self, reference: &str) -> Option<&CellValue> {
        let addr = CellAddress::parse(reference).ok()?;
        self.value(addr.row, addr.column)
    }

    /// Store a value at an A1-style reference
    ///
    /// A malformed reference is ignored and `None` is returned.
    pub fn set_value_by_ref<V: Into<CellValue>>(
        &mut self,
        reference: &str,
        value: V,
    ) -> Option<&mut Cell> {
        let addr = CellAddress::parse(reference).ok()?;
        Some(self.set_value(addr.row, addr.column, value))
    }

    // === Row metadata ===

    /// Check if a row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.rows.row(row).map_or(false, |r| r.hidden)
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.rows.get_or_create(row).hidden = hidden;
    }

    /// Row height in points (0 = default)
    pub fn row_height(&self, row: u32) -> f64 {
        self.rows.row(row).map_or(0.0, |r| r.height)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.rows.get_or_create(row).height = height;
    }

    /// Bottom-right corner of the populated area
    ///
    /// Rows that only carry metadata do not count. Returns `None` for a sheet
    /// without cells.
    pub fn dimension(&self) -> Option<CellAddress> {
        let mut corner: Option<CellAddress> = None;
        for (index, row) in self.rows.iter() {
            if let Some(column) = row.max_column() {
                let c = corner.get_or_insert(CellAddress::new(index, column));
                c.row = c.row.max(index);
                c.column = c.column.max(column);
            }
        }
        corner
    }
}
