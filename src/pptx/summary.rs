//! Serializable presentation summaries with resolved geometry.

use super::presentation::Presentation;
use super::sections::Section;
use super::shape::Shape;
use crate::error::{Error, Result};
use crate::model::{AutofitType, Placeholder, ShapeKind};
use serde::Serialize;

/// One shape with everything resolved through the placeholder chain.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSummary {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    /// Slide pixels; absent when the position cannot be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    pub width: i64,
    pub height: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofit: Option<AutofitType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<ShapeSummary>,
}

impl ShapeSummary {
    fn from_shape(shape: &Shape<'_>) -> Self {
        let frame = shape.text_frame();
        Self {
            id: shape.id(),
            name: shape.name(),
            kind: shape.kind(),
            placeholder: shape.placeholder(),
            x: shape.x().ok(),
            y: shape.y().ok(),
            width: shape.width().unwrap_or_default(),
            height: shape.height().unwrap_or_default(),
            text: frame.as_ref().map(|f| f.text()),
            autofit: frame.as_ref().map(|f| f.autofit()),
            shapes: shape.shapes().iter().map(Self::from_shape).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideSummary {
    /// 1-based slide number
    pub number: usize,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    pub shapes: Vec<ShapeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentationSummary {
    /// Slide size in pixels
    pub width: i64,
    pub height: i64,
    pub slides: Vec<SlideSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl Presentation {
    /// Summarize every slide and shape.
    pub fn summary(&self) -> PresentationSummary {
        let slides = self
            .slides()
            .iter()
            .map(|slide| SlideSummary {
                number: slide.number(),
                hidden: slide.hidden(),
                layout: slide.layout().and_then(|l| l.name()),
                shapes: slide.shapes().iter().map(ShapeSummary::from_shape).collect(),
            })
            .collect();

        PresentationSummary {
            width: self.slide_width(),
            height: self.slide_height(),
            slides,
            sections: self.sections(),
        }
    }

    /// Summary as JSON.
    pub fn summary_json(&self, pretty: bool) -> Result<String> {
        let summary = self.summary();
        let json = if pretty {
            serde_json::to_string_pretty(&summary)
        } else {
            serde_json::to_string(&summary)
        };
        json.map_err(|e| Error::InvalidData(e.to_string()))
    }
}
