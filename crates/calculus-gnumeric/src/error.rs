//! GNumeric error types

use thiserror::Error;

/// Result type for GNumeric operations
pub type GnumericResult<T> = std::result::Result<T, GnumericError>;

/// Errors that can occur during GNumeric reading/writing
#[derive(Debug, Error)]
pub enum GnumericError {
    /// IO error, including gzip stream errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Root element is not a GNumeric workbook
    #[error("Invalid GNumeric format: {0}")]
    InvalidFormat(String),

    /// A cell value could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] calculus_core::Error),
}
