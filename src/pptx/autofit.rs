//! Text autofit: shrink the font to fit the box, or resize the box to fit
//! the text.
//!
//! Measurements are pixels at the presentation DPI; results are written
//! back in points and EMU.

use super::font::ResolvedFont;
use super::metrics::GlyphMetrics;
use super::presentation::Presentation;
use super::resolve::resolved_box;
use super::shape::write_box;
use super::text::{TextFrame, TextLocation};
use crate::error::{Error, Result};
use crate::model::ResolvedBox;
use crate::options::MIN_SHRINK_FONT_SIZE;
use crate::units::{UnitConverter, EMU_PER_INCH};
use log::debug;

/// Most frequent size; ties go to the size seen first.
pub(crate) fn dominant_size(sizes: &[f64]) -> Option<f64> {
    let mut groups: Vec<(f64, usize)> = Vec::new();
    for &size in sizes {
        match groups.iter_mut().find(|(s, _)| *s == size) {
            Some(group) => group.1 += 1,
            None => groups.push((size, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for group in groups {
        if best.map_or(true, |b| group.1 > b.1) {
            best = Some(group);
        }
    }
    best.map(|(size, _)| size)
}

/// Lines needed to lay out `text` greedily word by word within `width`.
/// Paragraph breaks always start a new line; a word that does not fit where
/// it would go moves to the next line.
pub(crate) fn line_count(
    metrics: &dyn GlyphMetrics,
    text: &str,
    typeface: &str,
    size: f64,
    width: f64,
) -> usize {
    let space = metrics.text_width(" ", typeface, size);
    let mut lines = 0;
    for paragraph in text.split('\n') {
        lines += 1;
        let mut x = 0.0;
        for word in paragraph.split(' ') {
            let word_width = metrics.text_width(word, typeface, size);
            if word_width <= width - x {
                x += word_width + space;
            } else {
                lines += 1;
                x = word_width + space;
            }
        }
    }
    lines
}

/// Usable text area of a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextArea {
    /// Pixels
    pub width: f64,
    /// Pixels
    pub height: f64,
}

/// Largest size not above `points` at which `text` fits `area`, decreasing
/// one vertical pixel at a time and stopping at the minimum size. A shrunk
/// size is returned in whole points; text that already fits keeps `points`.
///
/// Line breaking runs in points against the area width on the horizontal
/// axis; line heights are vertical pixels against the area height.
pub(crate) fn shrink_font_size(
    metrics: &dyn GlyphMetrics,
    text: &str,
    typeface: &str,
    points: f64,
    area: TextArea,
    units: UnitConverter,
) -> f64 {
    let floor = units.points_to_px_y(MIN_SHRINK_FONT_SIZE);
    let width_points = units.px_to_points_x(area.width);
    let mut size = units.points_to_px_y(points);
    let mut shrunk = false;

    while size > floor {
        let lines = line_count(metrics, text, typeface, units.px_to_points_y(size), width_points);
        let line_height = metrics.line_height(typeface, size);
        let bottom = size + (lines.saturating_sub(1)) as f64 * line_height;
        if bottom <= area.height {
            break;
        }
        size -= 1.0;
        shrunk = true;
    }

    if !shrunk {
        return points;
    }
    units.px_to_points_y(size.max(floor)).round()
}

/// Margins of a text frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// New geometry for a resized shape, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResizePlan {
    pub height: f64,
    /// Amount the shape moves up
    pub y_shift: f64,
    /// New width for unwrapped text
    pub width: Option<f64>,
}

/// Size a box around `text`.
///
/// The upper-cased text is measured on one line and divided into rows of
/// the current usable width. Unwrapped text also sets the width from the
/// longest paragraph.
pub(crate) fn plan_resize(
    metrics: &dyn GlyphMetrics,
    text: &str,
    font: &ResolvedFont,
    box_size: (f64, f64),
    margins: Margins,
    wrapped: bool,
    units: UnitConverter,
) -> ResizePlan {
    let size_px = units.points_to_px_y(font.size);
    let text_width = units.points_to_px_x(metrics.text_width(&text.to_uppercase(), &font.latin_name, font.size));

    let usable_width = box_size.0 - margins.left - margins.right;
    let usable_height = box_size.1 - margins.top - margins.bottom;
    let rows = if usable_width > 0.0 {
        (text_width / usable_width).ceil().max(1.0)
    } else {
        1.0
    };

    let vertical_margins = margins.top + margins.bottom;
    let required_height = rows * size_px + vertical_margins;
    let height = required_height + 2.0 * vertical_margins;
    let y_shift = (required_height - usable_height) / 2.0;

    let width = (!wrapped).then(|| {
        let longest = text
            .split('\n')
            .max_by_key(|p| p.chars().count())
            .unwrap_or_default();
        units.points_to_px_x(metrics.text_width(longest, &font.latin_name, font.size)) + margins.left + margins.right
    });

    ResizePlan {
        height,
        y_shift,
        width,
    }
}

fn px_to_emu(px: f64, dpi: f64) -> i64 {
    (px * EMU_PER_INCH as f64 / dpi).round() as i64
}

fn emu_to_px(emu: i64, dpi: f64) -> f64 {
    emu as f64 * dpi / EMU_PER_INCH as f64
}

/// Resolved fonts of the first paragraph's portions, with the dominant size.
fn base_fonts(frame: &TextFrame<'_>) -> Result<Option<(f64, Vec<ResolvedFont>)>> {
    let Some(base) = frame.paragraph(0) else {
        return Ok(None);
    };
    let fonts = base
        .portions()
        .iter()
        .map(|p| p.font().resolved())
        .collect::<Result<Vec<_>>>()?;
    let sizes: Vec<f64> = fonts.iter().map(|f| f.size).collect();
    Ok(dominant_size(&sizes).map(|size| (size, fonts)))
}

/// Shrink the font until the frame's text fits its shape. The size is taken
/// from the first paragraph and written to every paragraph.
pub(crate) fn shrink(pres: &mut Presentation, location: &TextLocation) -> Result<()> {
    if location.cell.is_some() {
        return Ok(());
    }

    let options = pres.options().clone();
    let (text, dominant, typeface, insets, paragraphs) = {
        let frame = TextFrame::new(pres, location.clone());
        let Some((dominant, fonts)) = base_fonts(&frame)? else {
            return Ok(());
        };
        let typeface = fonts
            .iter()
            .find(|f| f.size == dominant)
            .map(|f| f.latin_name.clone())
            .unwrap_or_default();
        (frame.text(), dominant, typeface, frame.insets(), frame.paragraph_count())
    };

    let extent = resolved_box(pres, &location.shape)?.extent;
    let padding = 2.0 * options.shrink_padding_px;
    let area = TextArea {
        width: emu_to_px(extent.0 - insets.left - insets.right, options.horizontal_dpi) - padding,
        height: emu_to_px(extent.1 - insets.top - insets.bottom, options.vertical_dpi) - padding,
    };

    let size = shrink_font_size(
        pres.metrics(),
        &text,
        &typeface,
        dominant,
        area,
        options.converter(),
    );
    debug!("{}: shrink {}pt -> {}pt", location.shape, dominant, size);
    if size == dominant {
        return Ok(());
    }

    for index in 0..paragraphs {
        super::text::ParagraphMut::new(pres, location.clone(), index).set_font_size(size)?;
    }
    Ok(())
}

/// Grow or shrink the shape around the frame's text.
pub(crate) fn resize(pres: &mut Presentation, location: &TextLocation) -> Result<()> {
    if location.cell.is_some() {
        return Ok(());
    }

    let options = pres.options().clone();
    let (text, font, insets, wrapped) = {
        let frame = TextFrame::new(pres, location.clone());
        let Some((dominant, fonts)) = base_fonts(&frame)? else {
            return Ok(());
        };
        let Some(font) = fonts.into_iter().find(|f| f.size == dominant) else {
            return Ok(());
        };
        (frame.text(), font, frame.insets(), frame.wrapped())
    };

    let current = resolved_box(pres, &location.shape)?;
    let offset = current.offset.ok_or_else(|| {
        Error::ResolutionExhausted(format!("{} has no position to resize from", location.shape))
    })?;

    let (hdpi, vdpi) = (options.horizontal_dpi, options.vertical_dpi);
    let margins = Margins {
        left: emu_to_px(insets.left, hdpi),
        top: emu_to_px(insets.top, vdpi),
        right: emu_to_px(insets.right, hdpi),
        bottom: emu_to_px(insets.bottom, vdpi),
    };
    let box_size = (emu_to_px(current.extent.0, hdpi), emu_to_px(current.extent.1, vdpi));
    let plan = plan_resize(pres.metrics(), &text, &font, box_size, margins, wrapped, options.converter());
    debug!("{}: resize {:?}", location.shape, plan);

    let new_box = ResolvedBox {
        offset: Some((offset.0, offset.1 - px_to_emu(plan.y_shift, vdpi))),
        extent: (
            plan.width.map_or(current.extent.0, |w| px_to_emu(w, hdpi)),
            px_to_emu(plan.height, vdpi).max(0),
        ),
    };
    write_box(pres, &location.shape, &new_box)
}
