//! Unit conversions between EMU, pixels, points and centimetres.
//!
//! EMU (English Metric Unit) is the canonical storage unit of OpenXML
//! geometry. Pixels depend on the configured DPI and only appear at the
//! public API boundary.

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// EMUs per centimetre.
pub const EMU_PER_CM: i64 = 360_000;

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Converts between EMU and device units for a given DPI pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    /// Horizontal resolution in dots per inch
    pub horizontal_dpi: f64,
    /// Vertical resolution in dots per inch
    pub vertical_dpi: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(96.0, 96.0)
    }
}

impl UnitConverter {
    /// Create a converter for the given horizontal and vertical DPI.
    pub fn new(horizontal_dpi: f64, vertical_dpi: f64) -> Self {
        Self {
            horizontal_dpi,
            vertical_dpi,
        }
    }

    /// Horizontal EMU to pixels, rounded to the nearest pixel.
    pub fn emu_to_px_x(&self, emu: i64) -> i64 {
        emu_to_px(emu, self.horizontal_dpi)
    }

    /// Vertical EMU to pixels, rounded to the nearest pixel.
    pub fn emu_to_px_y(&self, emu: i64) -> i64 {
        emu_to_px(emu, self.vertical_dpi)
    }

    /// Horizontal pixels to EMU.
    pub fn px_to_emu_x(&self, px: i64) -> i64 {
        px_to_emu(px, self.horizontal_dpi)
    }

    /// Vertical pixels to EMU.
    pub fn px_to_emu_y(&self, px: i64) -> i64 {
        px_to_emu(px, self.vertical_dpi)
    }

    /// Points to horizontal pixels (unrounded).
    pub fn points_to_px_x(&self, points: f64) -> f64 {
        points * self.horizontal_dpi / POINTS_PER_INCH
    }

    /// Points to vertical pixels (unrounded).
    pub fn points_to_px_y(&self, points: f64) -> f64 {
        points * self.vertical_dpi / POINTS_PER_INCH
    }

    /// Horizontal pixels to points (unrounded).
    pub fn px_to_points_x(&self, px: f64) -> f64 {
        px * POINTS_PER_INCH / self.horizontal_dpi
    }

    /// Vertical pixels to points (unrounded).
    pub fn px_to_points_y(&self, px: f64) -> f64 {
        px * POINTS_PER_INCH / self.vertical_dpi
    }

    /// Centimetres to horizontal pixels (unrounded).
    pub fn cm_to_px_x(&self, cm: f64) -> f64 {
        cm * self.horizontal_dpi / 2.54
    }

    /// Centimetres to vertical pixels (unrounded).
    pub fn cm_to_px_y(&self, cm: f64) -> f64 {
        cm * self.vertical_dpi / 2.54
    }
}

/// EMU to pixels at `dpi`, rounded to the nearest pixel.
///
/// This direction is lossy: several EMU values map to the same pixel.
pub fn emu_to_px(emu: i64, dpi: f64) -> i64 {
    (emu as f64 * dpi / EMU_PER_INCH as f64).round() as i64
}

/// Pixels to EMU at `dpi`, rounded to the nearest EMU.
///
/// `emu_to_px(px_to_emu(px, dpi), dpi) == px` for every pixel value.
pub fn px_to_emu(px: i64, dpi: f64) -> i64 {
    (px as f64 * EMU_PER_INCH as f64 / dpi).round() as i64
}

/// EMU to points.
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

/// Points to EMU, rounded.
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

/// EMU to centimetres.
pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMU_PER_CM as f64
}

/// Centimetres to EMU, rounded.
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_to_px_at_96_dpi() {
        assert_eq!(emu_to_px(914_400, 96.0), 96);
        assert_eq!(emu_to_px(9525, 96.0), 1);
        assert_eq!(emu_to_px(0, 96.0), 0);
    }

    #[test]
    fn test_px_round_trip() {
        for px in [-500, -1, 0, 1, 7, 96, 1280] {
            assert_eq!(emu_to_px(px_to_emu(px, 96.0), 96.0), px);
            assert_eq!(emu_to_px(px_to_emu(px, 72.0), 72.0), px);
        }
    }

    #[test]
    fn test_emu_round_trip_is_lossy() {
        let emu = 9_600;
        let back = px_to_emu(emu_to_px(emu, 96.0), 96.0);
        assert_eq!(back, 9_525);
        assert_ne!(back, emu);
    }

    #[test]
    fn test_points_and_cm() {
        assert_eq!(points_to_emu(1.0), 12_700);
        assert!((emu_to_points(25_400) - 2.0).abs() < f64::EPSILON);
        assert_eq!(cm_to_emu(0.25), 90_000);
        assert!((emu_to_cm(46_800) - 0.13).abs() < 1e-9);
    }

    #[test]
    fn test_converter_dpi() {
        let conv = UnitConverter::new(192.0, 96.0);
        assert_eq!(conv.emu_to_px_x(914_400), 192);
        assert_eq!(conv.emu_to_px_y(914_400), 96);
        assert!((conv.points_to_px_x(12.0) - 32.0).abs() < 1e-9);
        assert!((conv.points_to_px_y(12.0) - 16.0).abs() < 1e-9);
        assert!((conv.px_to_points_y(16.0) - 12.0).abs() < 1e-9);
        assert!((conv.cm_to_px_y(2.54) - 96.0).abs() < 1e-9);
    }
}
