//! PowerPoint presentation object model.
//!
//! [`Presentation`] owns the parsed parts. Views such as [`Slide`], [`Shape`]
//! and [`TextFrame`] borrow it and resolve inherited values on demand;
//! mutable views ([`ShapeMut`], [`TextFrameMut`], ...) write through it.

mod autofit;
mod cache;
mod chart;
mod fill;
mod font;
mod group;
mod metrics;
mod part;
mod presentation;
mod resolve;
mod sections;
mod shape;
mod slide;
mod styles;
mod summary;
mod table;
mod text;
mod theme;

pub use chart::{parse_chart_xml, Chart, ChartData, ChartSeries};
pub use fill::{ColorSpec, FillType, ShapeFill, ShapeOutline};
pub use font::{Font, FontMut, ResolvedFont};
pub use group::{on_child_x_changed, on_child_y_changed};
pub use metrics::{ApproximateMetrics, FaceMetrics, GlyphMetrics};
pub use presentation::Presentation;
pub use resolve::match_placeholder;
pub use sections::Section;
pub use shape::{Shape, ShapeMut};
pub use slide::{Slide, SlideLayout, SlideMaster};
pub use summary::{PresentationSummary, ShapeSummary, SlideSummary};
pub use table::{Table, TableMut};
pub use text::{
    Paragraph, ParagraphMut, Portion, PortionKey, PortionMut, TextFrame, TextFrameMut,
    TextLocation,
};
pub use theme::{ColorMap, Theme};
