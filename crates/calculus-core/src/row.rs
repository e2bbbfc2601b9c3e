//! Sparse grid types
//!
//! A [`Row`] maps column indices to cells and a [`Rows`] collection maps row indices
//! to rows. Slots that were never written are absent, which is different from a
//! slot holding an empty cell.
//!
//! Both levels offer two traversals: `iter` walks entries in hash order and is meant
//! for readers that only build structure, `stable_iter` walks them in ascending
//! index order and is what writers must use.

use std::collections::hash_map::Entry;

use ahash::AHashMap;

use crate::cell::Cell;

/// A row of cells plus its display metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: AHashMap<u32, Cell>,
    /// Row is hidden
    pub hidden: bool,
    /// Row height in points (0 = default)
    pub height: f64,
}

impl Row {
    /// Create a new row with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, column: u32) -> Option<&Cell> {
        self.cells.get(&column)
    }

    pub fn cell_mut(&mut self, column: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&column)
    }

    /// Store a cell, replacing whatever was at `column`
    pub fn set_cell(&mut self, column: u32, cell: Cell) -> &mut Cell {
        match self.cells.entry(column) {
            Entry::Occupied(mut slot) => {
                slot.insert(cell);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(cell),
        }
    }

    /// Remove the cell at `column`, making the slot absent again
    pub fn remove_cell(&mut self, column: u32) -> Option<Cell> {
        self.cells.remove(&column)
    }

    /// Visit populated cells in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells.iter().map(|(&column, cell)| (column, cell))
    }

    /// Visit populated cells in ascending column order
    pub fn stable_iter(&self) -> impl Iterator<Item = (u32, &Cell)> {
        let mut cells: Vec<(u32, &Cell)> = self.iter().collect();
        cells.sort_unstable_by_key(|(column, _)| *column);
        cells.into_iter()
    }

    /// Highest populated column index
    pub fn max_column(&self) -> Option<u32> {
        self.cells.keys().copied().max()
    }

    /// Number of populated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if this row has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.hidden || self.height > 0.0
    }
}

/// Sparse collection of rows owned by a sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    rows: AHashMap<u32, Row>,
}

impl Rows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `(row, column)`, absent if the slot was never written
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cell(column))
    }

    pub fn cell_mut(&mut self, row: u32, column: u32) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.cell_mut(column))
    }

    /// Store a cell, creating the row on first write
    pub fn set_cell(&mut self, row: u32, column: u32, cell: Cell) -> &mut Cell {
        self.get_or_create(row).set_cell(column, cell)
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    pub fn row_mut(&mut self, row: u32) -> Option<&mut Row> {
        self.rows.get_mut(&row)
    }

    /// Get the row at `row`, inserting an empty one if absent
    pub fn get_or_create(&mut self, row: u32) -> &mut Row {
        self.rows.entry(row).or_default()
    }

    /// Remove a whole row
    pub fn remove(&mut self, row: u32) -> Option<Row> {
        self.rows.remove(&row)
    }

    /// Visit rows in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(&index, row)| (index, row))
    }

    /// Visit rows in ascending index order
    pub fn stable_iter(&self) -> impl Iterator<Item = (u32, &Row)> {
        let mut rows: Vec<(u32, &Row)> = self.iter().collect();
        rows.sort_unstable_by_key(|(index, _)| *index);
        rows.into_iter()
    }

    /// Highest populated row index
    pub fn max_row(&self) -> Option<u32> {
        self.rows.keys().copied().max()
    }

    /// Number of rows present (including rows with metadata only)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
