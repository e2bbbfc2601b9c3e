//! Document metadata

use chrono::{DateTime, Utc};

/// Workbook properties and metadata
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    /// Name of the application that produced the document
    pub application: String,
    pub creator: String,
    pub last_modified_by: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub keywords: String,
    pub category: String,
    /// Serial dates count from 1904-01-01 instead of 1899-12-31
    pub date1904: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }
}
