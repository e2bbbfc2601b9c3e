//! Error types for calculus-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in calculus-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Reference does not match the `[A-Z]+[0-9]+` grammar
    #[error("Malformed cell reference: {0:?}")]
    MalformedReference(String),

    /// Negative row or column passed to the coordinate formatter
    #[error("Invalid coordinate: row {row}, column {column}")]
    InvalidCoordinate { row: i64, column: i64 },

    /// Sheet name already in use
    #[error("Workbook already contains a sheet named {0}")]
    DuplicateSheetName(String),

    /// Sheet not found by name
    #[error("There is no sheet with name {0}")]
    SheetNotFound(String),

    /// Text does not match the ISO-8601 duration grammar
    #[error("Malformed duration: {0:?}")]
    MalformedDuration(String),

    /// A value cannot be represented in the target format
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
