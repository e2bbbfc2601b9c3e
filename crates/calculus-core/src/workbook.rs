//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::properties::Properties;
use crate::sheet::Sheet;

/// A workbook (spreadsheet document)
///
/// An ordered collection of uniquely named sheets plus document-wide settings.
/// Whenever the workbook has sheets, the active index points at one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    active: Option<usize>,
    properties: Properties,
    /// Show the horizontal scroll bar
    pub show_horizontal_scroll: bool,
    /// Show the vertical scroll bar
    pub show_vertical_scroll: bool,
    /// Show the sheet tab bar
    pub show_sheet_tabs: bool,
}

impl Workbook {
    /// Create an empty workbook with no sheets
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            active: None,
            properties: Properties::default(),
            show_horizontal_scroll: true,
            show_vertical_scroll: true,
            show_sheet_tabs: true,
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Get the number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// All sheets in workbook order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Iterate over all sheets mutably
    ///
    /// Renaming through this iterator bypasses the uniqueness check; use
    /// [`rename_sheet`](Self::rename_sheet) instead.
    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Get a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Get a mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Get a sheet by position
    pub fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_at_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    /// Append a new sheet and make it active
    pub fn add_sheet<S: Into<String>>(&mut self, name: S) -> Result<&mut Sheet> {
        let name = name.into();
        self.ensure_unique(&name)?;

        self.sheets.push(Sheet::new(name));
        let index = self.sheets.len() - 1;
        self.active = Some(index);
        Ok(&mut self.sheets[index])
    }

    /// Prepend a new sheet and make it active
    pub fn add_sheet_first<S: Into<String>>(&mut self, name: S) -> Result<&mut Sheet> {
        let name = name.into();
        self.ensure_unique(&name)?;

        self.sheets.insert(0, Sheet::new(name));
        self.active = Some(0);
        Ok(&mut self.sheets[0])
    }

    /// Remove the sheet named `name`
    ///
    /// The active index follows the previously active sheet, or moves to its
    /// predecessor when the active sheet itself is removed.
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        let sheet = self.sheets.remove(index);

        self.active = match self.active {
            _ if self.sheets.is_empty() => None,
            Some(active) if index <= active => Some(active.saturating_sub(1)),
            other => other,
        };

        Ok(sheet)
    }

    /// Rename a sheet, keeping names unique
    pub fn rename_sheet(&mut self, name: &str, new_name: &str) -> Result<()> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        if name != new_name {
            self.ensure_unique(new_name)?;
        }
        self.sheets[index].set_name(new_name);
        Ok(())
    }

    /// Make the sheet named `name` active
    ///
    /// Returns `None`, leaving the active sheet untouched, if no sheet has that name.
    pub fn set_active(&mut self, name: &str) -> Option<&mut Sheet> {
        let index = self.sheet_index(name)?;
        self.active = Some(index);
        Some(&mut self.sheets[index])
    }

    /// Make the sheet at `index` active
    pub fn set_active_index(&mut self, index: usize) -> Option<&mut Sheet> {
        let sheet = self.sheets.get_mut(index)?;
        self.active = Some(index);
        Some(sheet)
    }

    /// Index of the active sheet, `None` for a workbook without sheets
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.active.and_then(|index| self.sheets.get(index))
    }

    pub fn active_sheet_mut(&mut self) -> Option<&mut Sheet> {
        self.active.and_then(|index| self.sheets.get_mut(index))
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.sheet(name).is_some() {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
