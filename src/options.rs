//! Presentation options and process-wide constants.

use crate::units::UnitConverter;

/// Font size in points used when nothing in the inheritance chain sets one.
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Default left and right text frame inset in centimetres.
pub const DEFAULT_LEFT_RIGHT_MARGIN_CM: f64 = 0.25;

/// Default top and bottom text frame inset in centimetres.
pub const DEFAULT_TOP_BOTTOM_MARGIN_CM: f64 = 0.13;

/// Smallest font size, in points, that shrink-on-overflow will produce.
pub const MIN_SHRINK_FONT_SIZE: f64 = 5.0;

/// Height of a new table row in EMU.
pub const DEFAULT_ROW_HEIGHT_EMU: i64 = 370_840;

/// Default padding in pixels kept free on each side during shrink layout.
pub const DEFAULT_SHRINK_PADDING_PX: f64 = 10.0;

/// Options controlling unit conversion and mutation behaviour.
#[derive(Debug, Clone)]
pub struct PresentationOptions {
    /// Horizontal DPI used for pixel conversions
    pub horizontal_dpi: f64,

    /// Vertical DPI used for pixel conversions
    pub vertical_dpi: f64,

    /// Grow a group downward when a child is moved below its bottom edge.
    ///
    /// Off by default: only the top edge is adjusted on vertical moves,
    /// while horizontal moves adjust both edges.
    pub symmetric_vertical_growth: bool,

    /// Padding in pixels kept free on each side when shrinking text
    pub shrink_padding_px: f64,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            horizontal_dpi: 96.0,
            vertical_dpi: 96.0,
            symmetric_vertical_growth: false,
            shrink_padding_px: DEFAULT_SHRINK_PADDING_PX,
        }
    }
}

impl PresentationOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both horizontal and vertical DPI.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.horizontal_dpi = dpi;
        self.vertical_dpi = dpi;
        self
    }

    /// Set horizontal DPI.
    pub fn with_horizontal_dpi(mut self, dpi: f64) -> Self {
        self.horizontal_dpi = dpi;
        self
    }

    /// Set vertical DPI.
    pub fn with_vertical_dpi(mut self, dpi: f64) -> Self {
        self.vertical_dpi = dpi;
        self
    }

    /// Grow groups downward as well as upward on vertical child moves.
    pub fn with_symmetric_vertical_growth(mut self, enabled: bool) -> Self {
        self.symmetric_vertical_growth = enabled;
        self
    }

    /// Set the shrink layout padding in pixels.
    pub fn with_shrink_padding_px(mut self, padding: f64) -> Self {
        self.shrink_padding_px = padding;
        self
    }

    /// Unit converter for the configured DPI.
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(self.horizontal_dpi, self.vertical_dpi)
    }
}
