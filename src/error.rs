//! Error types for the slidekit library.

use std::io;
use thiserror::Error;

/// Result type alias for slidekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or editing a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// No explicit value exists and the shape has no placeholder to inherit from.
    #[error("Resolution exhausted: {0}")]
    ResolutionExhausted(String),

    /// The requested change is not allowed for this shape. Nothing was written.
    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    /// A caller-supplied reference (URI, colour, ...) is malformed. Nothing was written.
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// A shape key does not address a shape element.
    #[error("Shape not found: {0}")]
    ShapeNotFound(String),

    /// Slide index out of range.
    #[error("Slide not found: {0}")]
    SlideNotFound(usize),

    /// Layout index out of range.
    #[error("Layout not found: {0}")]
    LayoutNotFound(usize),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
