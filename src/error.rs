//! Error Handling Module
//!
//! This module defines custom error types for the DMARC failure reporter using the `thiserror` crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmarcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed report: {0}")]
    MalformedReport(String),

    #[error("Missing {field} in {mechanism} auth result")]
    MissingField {
        mechanism: &'static str,
        field: &'static str,
    },

    #[error("Reverse lookup failed: {0}")]
    Resolution(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
}

impl DmarcError {
    /// True when the input could not be turned into a report document,
    /// either because the markup is broken or because mandatory elements are absent.
    pub fn is_malformed(&self) -> bool {
        matches!(self, DmarcError::Xml(_) | DmarcError::MalformedReport(_))
    }
}

pub type Result<T> = std::result::Result<T, DmarcError>;
