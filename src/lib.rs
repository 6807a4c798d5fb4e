//! # slidekit
//!
//! Read and edit PowerPoint (.pptx) presentations through a shape object
//! model.
//!
//! Placeholder shapes inherit position, size and fonts from their slide
//! layout and master; `slidekit` resolves those values on demand and keeps
//! group bounds consistent when grouped shapes move.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidekit::Presentation;
//!
//! let mut pres = Presentation::open("deck.pptx")?;
//!
//! // Read resolved geometry
//! let slide = pres.slide(0)?;
//! for shape in slide.shapes() {
//!     println!("{}: {}x{}", shape.name(), shape.width()?, shape.height()?);
//! }
//!
//! // Edit text; autofit runs as configured on the text frame
//! let key = pres.find_shape(0, "Title 1")?;
//! pres.shape_mut(&key)?.text_frame_mut()?.set_text("Quarterly review")?;
//! pres.save("deck-edited.pptx")?;
//! # Ok::<(), slidekit::Error>(())
//! ```
//!
//! ## Units
//!
//! Geometry is stored in EMU. The public API speaks pixels at the DPI set
//! in [`PresentationOptions`] (96 by default), points for font sizes and
//! centimetres for text margins.

pub mod container;
pub mod error;
pub mod model;
pub mod options;
pub mod pptx;
pub mod units;
pub mod xml;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use error::{Error, Result};
pub use model::{
    AutofitType, FieldType, GeometryType, GroupTransform, PartRef, Placeholder, PlaceholderType,
    ResolvedBox, Resource, ResourceType, ShapeKey, ShapeKind, TextAlignment, VerticalAlignment,
};
pub use options::PresentationOptions;
pub use pptx::{
    ApproximateMetrics, Chart, ChartData, ChartSeries, FaceMetrics, FillType, Font, FontMut,
    GlyphMetrics, Paragraph, ParagraphMut, Portion, PortionMut, Presentation,
    PresentationSummary, Section, Shape, ShapeFill, ShapeMut, ShapeOutline, Slide, SlideLayout,
    SlideMaster, Table, TableMut, TextFrame, TextFrameMut,
};
pub use units::UnitConverter;

use std::path::Path;

/// Open a presentation file.
///
/// # Example
///
/// ```no_run
/// let pres = slidekit::open("deck.pptx")?;
/// println!("{} slides", pres.slide_count());
/// # Ok::<(), slidekit::Error>(())
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<Presentation> {
    Presentation::open(path)
}

/// Extract the text of every slide, slides separated by blank lines.
///
/// # Example
///
/// ```no_run
/// let text = slidekit::extract_text("deck.pptx")?;
/// println!("{}", text);
/// # Ok::<(), slidekit::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let pres = Presentation::open(path)?;
    Ok(pres
        .slides()
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Summarize a presentation file as JSON.
pub fn summary_json(path: impl AsRef<Path>) -> Result<String> {
    Presentation::open(path)?.summary_json(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(open("does-not-exist.pptx"), Err(Error::Io(_))));
    }
}
