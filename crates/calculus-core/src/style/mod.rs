//! Cell styling types
//!
//! - [`Style`] - Complete cell style
//! - [`Font`] - Font settings
//! - [`StylePool`] - Shared, deduplicated style instances

mod font;
mod pool;

pub use font::Font;
pub use pool::StylePool;

/// Complete cell style
///
/// Cells hold styles behind an `Arc`, so many cells can point at one instance.
/// Use [`StylePool`] to deduplicate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Font settings (None = format default)
    pub font: Option<Font>,
    /// Number format code (empty = General)
    pub number_format: String,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the style carries no settings at all
    pub fn is_default(&self) -> bool {
        self.font.is_none() && self.number_format.is_empty()
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font_mut().bold = bold;
        self
    }

    /// Set font to italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.font_mut().italic = italic;
        self
    }

    /// Set font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_mut().size = size;
        self
    }

    /// Set font name
    pub fn font_name<S: Into<String>>(mut self, name: S) -> Self {
        self.font_mut().name = name.into();
        self
    }

    /// Set font color
    pub fn font_color<S: Into<String>>(mut self, color: S) -> Self {
        self.font_mut().color = color.into();
        self
    }

    /// Set number format string
    pub fn number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = format.into();
        self
    }

    /// Get the font settings, creating default ones if missing
    pub fn font_mut(&mut self) -> &mut Font {
        self.font.get_or_insert_with(Font::default)
    }
}
