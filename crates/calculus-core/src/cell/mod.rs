//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Cell`] - A value plus its style, comment and formula marker
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")

mod address;
mod value;

use std::sync::Arc;

use crate::style::Style;

pub use address::{format_coordinate, parse_coordinate, CellAddress};
pub use value::{CellValue, CellValueType};

/// A single grid cell
///
/// The value type is always derived from the stored [`CellValue`]. Setting a new
/// value replaces value and type in one step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    value: CellValue,
    style: Option<Arc<Style>>,
    comment: Option<String>,
    formula: Option<String>,
}

impl Cell {
    /// Create a cell holding `value`
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Take the value out of the cell, leaving it empty
    pub fn take_value(&mut self) -> CellValue {
        std::mem::take(&mut self.value)
    }

    pub fn value_type(&self) -> CellValueType {
        self.value.value_type()
    }

    pub fn set_value<V: Into<CellValue>>(&mut self, value: V) {
        self.value = value.into();
    }

    /// Shared style attached to the cell
    pub fn style(&self) -> Option<&Arc<Style>> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: Option<Arc<Style>>) {
        self.style = style;
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment<S: Into<String>>(&mut self, comment: Option<S>) {
        self.comment = comment.map(Into::into);
    }

    /// Formula text kept from the source document
    ///
    /// Formulas are never evaluated. Codecs that understand formulas write this
    /// text back out; the value holds the last cached result.
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    pub fn set_formula<S: Into<String>>(&mut self, formula: Option<S>) {
        self.formula = formula.map(Into::into);
    }

    /// Builder-style variant of [`set_style`](Self::set_style)
    pub fn with_style(mut self, style: Arc<Style>) -> Self {
        self.style = Some(style);
        self
    }

    /// Builder-style variant of [`set_comment`](Self::set_comment)
    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder-style variant of [`set_formula`](Self::set_formula)
    pub fn with_formula<S: Into<String>>(mut self, formula: S) -> Self {
        self.formula = Some(formula.into());
        self
    }
}
