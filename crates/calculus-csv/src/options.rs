//! CSV options

/// Type a column is converted to while reading
///
/// Columns without a hint are read as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvHint {
    #[default]
    String,
    /// `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts
    Boolean,
    /// Signed 64-bit decimal integer
    Integer,
    Float,
    /// `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS[.ffffff]` for longer values
    Date,
    /// ISO-8601 duration such as `PT1H30M`
    Duration,
}

/// CSV dialect and reading hints
///
/// The same options drive reading and writing. `delimiter`, `enclosure` and
/// `escape` are single ASCII bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Character wrapping values that contain whitespace or special characters
    /// (default: double quote)
    pub enclosure: u8,
    /// Character prefixing delimiters and enclosures inside values (default: backslash)
    pub escape: u8,
    /// Lines starting with this prefix are skipped when reading
    pub comment: Option<String>,
    /// Per-column types applied while reading, by position
    pub hints: Vec<CsvHint>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            enclosure: b'"',
            escape: b'\\',
            comment: None,
            hints: Vec::new(),
        }
    }
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the enclosure character
    pub fn with_enclosure(mut self, enclosure: u8) -> Self {
        self.enclosure = enclosure;
        self
    }

    /// Set the escape character
    pub fn with_escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// Set the comment prefix
    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the column type hints
    pub fn with_hints<I: IntoIterator<Item = CsvHint>>(mut self, hints: I) -> Self {
        self.hints = hints.into_iter().collect();
        self
    }
}
