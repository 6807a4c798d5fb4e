//! Glyph measurement used by text autofit.
//!
//! Sizes passed in and widths returned share one unit: measuring at a size
//! in pixels yields pixels, at a size in points yields points.

use crate::error::{Error, Result};
use std::path::Path;
use unicode_width::UnicodeWidthChar;

/// Text measurement provider.
pub trait GlyphMetrics {
    /// Advance width of `text` set in `typeface` at `size`.
    fn text_width(&self, text: &str, typeface: &str, size: f64) -> f64;

    /// Distance between consecutive baselines for `typeface` at `size`.
    fn line_height(&self, typeface: &str, size: f64) -> f64 {
        let _ = typeface;
        size * 1.2
    }
}

/// Font-independent estimate from per-character em advances.
///
/// Wide (East Asian) characters advance a full em, upper case letters a
/// little more than other narrow characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMetrics {
    /// Advance of a regular narrow character, in em
    pub narrow_advance: f64,
    /// Advance of an upper case letter, in em
    pub upper_advance: f64,
    /// Advance of a thin character (`i`, `l`, punctuation), in em
    pub thin_advance: f64,
    /// Advance of a space, in em
    pub space_advance: f64,
    /// Line height as a multiple of the size
    pub line_spacing: f64,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            narrow_advance: 0.52,
            upper_advance: 0.65,
            thin_advance: 0.28,
            space_advance: 0.25,
            line_spacing: 1.2,
        }
    }
}

impl ApproximateMetrics {
    /// Advance of one character in em.
    pub fn char_advance(&self, c: char) -> f64 {
        match c {
            ' ' | '\u{a0}' => self.space_advance,
            'i' | 'l' | 'j' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => self.thin_advance,
            c => match c.width() {
                None | Some(0) => 0.0,
                Some(2) => 1.0,
                Some(_) if c.is_uppercase() => self.upper_advance,
                Some(_) => self.narrow_advance,
            },
        }
    }
}

impl GlyphMetrics for ApproximateMetrics {
    fn text_width(&self, text: &str, _typeface: &str, size: f64) -> f64 {
        text.chars().map(|c| self.char_advance(c)).sum::<f64>() * size
    }

    fn line_height(&self, _typeface: &str, size: f64) -> f64 {
        size * self.line_spacing
    }
}

/// Measurement from a real font file.
///
/// The face is used for every typeface; characters it has no glyph for fall
/// back to [`ApproximateMetrics`].
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    data: Vec<u8>,
    index: u32,
    fallback: ApproximateMetrics,
}

impl FaceMetrics {
    /// Load the first face of a TrueType/OpenType font.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_index(data, 0)
    }

    /// Load a face from a font collection.
    pub fn from_bytes_with_index(data: Vec<u8>, index: u32) -> Result<Self> {
        ttf_parser::Face::parse(&data, index)
            .map_err(|e| Error::InvalidData(format!("font face: {}", e)))?;
        Ok(Self {
            data,
            index,
            fallback: ApproximateMetrics::default(),
        })
    }

    /// Load a font file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

impl GlyphMetrics for FaceMetrics {
    fn text_width(&self, text: &str, typeface: &str, size: f64) -> f64 {
        let Some(face) = self.face() else {
            return self.fallback.text_width(text, typeface, size);
        };
        let units_per_em = f64::from(face.units_per_em());

        text.chars()
            .map(|c| {
                match face
                    .glyph_index(c)
                    .and_then(|g| face.glyph_hor_advance(g))
                {
                    Some(advance) => f64::from(advance) / units_per_em * size,
                    None => self.fallback.char_advance(c) * size,
                }
            })
            .sum()
    }

    fn line_height(&self, typeface: &str, size: f64) -> f64 {
        let Some(face) = self.face() else {
            return self.fallback.line_height(typeface, size);
        };
        let units = f64::from(face.ascender()) - f64::from(face.descender())
            + f64::from(face.line_gap());
        units / f64::from(face.units_per_em()) * size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_scales_with_size() {
        let m = ApproximateMetrics::default();
        let small = m.text_width("Hello world", "Calibri", 10.0);
        let large = m.text_width("Hello world", "Calibri", 20.0);
        assert!((large - 2.0 * small).abs() < 1e-9);
        assert_eq!(m.text_width("", "Calibri", 12.0), 0.0);
    }

    #[test]
    fn test_approximate_wide_characters() {
        let m = ApproximateMetrics::default();
        assert_eq!(m.char_advance('漢'), 1.0);
        assert!(m.char_advance('W') > m.char_advance('w'));
        assert!(m.char_advance('i') < m.char_advance('w'));
    }

    #[test]
    fn test_face_metrics_rejects_garbage() {
        assert!(FaceMetrics::from_bytes(vec![0, 1, 2, 3]).is_err());
    }
}
