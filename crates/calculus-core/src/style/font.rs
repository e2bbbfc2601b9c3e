//! Font style types

/// Font style settings
///
/// `color` is either a CSS color name (`red`, `aliceblue`), a 6-digit hex RGB value
/// (`#ffd700`) or an 8-digit hex RGBA value (`#ff7f5080`). An empty name, color or a
/// zero size means "use the format default".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: String,
    /// Font size in points
    pub size: f64,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Single underline
    pub underline: bool,
    /// Strikethrough
    pub strikethrough: bool,
    /// Font color
    pub color: String,
}

impl Font {
    /// Create a new default font
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set underline
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Set strikethrough
    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    /// Set color
    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = color.into();
        self
    }

    /// Set the color from RGB components (`#rrggbb`)
    pub fn rgb(&mut self, r: u8, g: u8, b: u8) {
        self.color = format!("#{:02x}{:02x}{:02x}", r, g, b);
    }

    /// Set the color from RGBA components (`#rrggbbaa`)
    pub fn rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.color = format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a);
    }

    /// The color as a 6-digit hex string without `#`, if it is in hex form
    ///
    /// The alpha component of RGBA colors is dropped.
    pub fn hex_rgb(&self) -> Option<&str> {
        let hex = self.color.strip_prefix('#')?;
        if (hex.len() == 6 || hex.len() == 8) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(&hex[..6])
        } else {
            None
        }
    }
}

impl std::hash::Hash for Font {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
    }
}

impl Eq for Font {}
