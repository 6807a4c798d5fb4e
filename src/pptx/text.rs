//! Text frames, paragraphs and portions.
//!
//! A text body (`p:txBody` of a shape, `a:txBody` of a table cell) holds
//! `a:p` paragraphs; a paragraph holds portions, which are `a:r` runs and
//! `a:fld` fields, separated by optional `a:br` line breaks.

use super::autofit;
use super::fill::parse_hex_color;
use super::font::{Font, FontMut, RUN_PROPERTIES_ORDER};
use super::part::rel_types;
use super::presentation::Presentation;
use super::styles::MAX_LEVEL;
use super::table::{cell_element, cell_element_mut};
use crate::error::{Error, Result};
use crate::model::{AutofitType, FieldType, ShapeKey, TextAlignment, VerticalAlignment};
use crate::options::{DEFAULT_LEFT_RIGHT_MARGIN_CM, DEFAULT_TOP_BOTTOM_MARGIN_CM};
use crate::units::{cm_to_emu, emu_to_cm};
use crate::xml::{XmlElement, XmlNode};
use log::debug;

/// Child order of `a:bodyPr`.
const BODY_PROPERTIES_ORDER: &[&str] = &[
    "prstTxWarp",
    "noAutofit",
    "normAutofit",
    "spAutoFit",
    "scene3d",
    "sp3d",
    "flatTx",
    "extLst",
];

/// Child order of a text body.
const TEXT_BODY_ORDER: &[&str] = &["bodyPr", "lstStyle", "p"];

/// Child order of `a:lstStyle`.
const LIST_STYLE_ORDER: &[&str] = &[
    "defPPr", "lvl1pPr", "lvl2pPr", "lvl3pPr", "lvl4pPr", "lvl5pPr", "lvl6pPr", "lvl7pPr",
    "lvl8pPr", "lvl9pPr", "extLst",
];

/// Child order of `a:pPr` and the list style level elements.
const PARAGRAPH_PROPERTIES_ORDER: &[&str] = &[
    "lnSpc", "spcBef", "spcAft", "buClrTx", "buClr", "buSzTx", "buSzPct", "buSzPts", "buFontTx",
    "buFont", "buNone", "buAutoNum", "buChar", "buBlip", "tabLst", "defRPr", "extLst",
];

/// Where a text body lives: a shape, or a cell of a table shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    pub shape: ShapeKey,
    /// `(row, column)` for table cells
    pub cell: Option<(usize, usize)>,
}

impl TextLocation {
    /// Text body of a shape.
    pub fn shape(key: ShapeKey) -> Self {
        Self {
            shape: key,
            cell: None,
        }
    }

    /// Text body of a table cell.
    pub fn cell(key: ShapeKey, row: usize, column: usize) -> Self {
        Self {
            shape: key,
            cell: Some((row, column)),
        }
    }
}

/// Address of one portion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortionKey {
    pub text: TextLocation,
    pub paragraph: usize,
    pub portion: usize,
}

pub(crate) fn body_of(shape_el: &XmlElement, cell: Option<(usize, usize)>) -> Option<&XmlElement> {
    match cell {
        None => shape_el.child("txBody"),
        Some((row, column)) => cell_element(shape_el, row, column)?.child("txBody"),
    }
}

pub(crate) fn body_mut_of(
    shape_el: &mut XmlElement,
    cell: Option<(usize, usize)>,
) -> Option<&mut XmlElement> {
    match cell {
        None => shape_el.child_mut("txBody"),
        Some((row, column)) => cell_element_mut(shape_el, row, column)?.child_mut("txBody"),
    }
}

fn is_portion(el: &XmlElement) -> bool {
    el.is("r") || el.is("fld")
}

/// Element index of the `index`-th child satisfying `pred`.
fn nth_position(parent: &XmlElement, index: usize, pred: impl Fn(&XmlElement) -> bool) -> Option<usize> {
    parent
        .elements()
        .enumerate()
        .filter(|(_, e)| pred(e))
        .nth(index)
        .map(|(i, _)| i)
}

pub(crate) fn paragraph_at(body: &XmlElement, index: usize) -> Option<&XmlElement> {
    body.children_named("p").nth(index)
}

pub(crate) fn paragraph_at_mut(body: &mut XmlElement, index: usize) -> Option<&mut XmlElement> {
    let pos = nth_position(body, index, |e| e.is("p"))?;
    body.element_at_mut(pos)
}

pub(crate) fn portion_at(paragraph: &XmlElement, index: usize) -> Option<&XmlElement> {
    paragraph.elements().filter(|e| is_portion(e)).nth(index)
}

pub(crate) fn portion_at_mut(
    body: &mut XmlElement,
    paragraph: usize,
    portion: usize,
) -> Option<&mut XmlElement> {
    let p = paragraph_at_mut(body, paragraph)?;
    let pos = nth_position(p, portion, is_portion)?;
    p.element_at_mut(pos)
}

fn portion_count(paragraph: &XmlElement) -> usize {
    paragraph.elements().filter(|e| is_portion(e)).count()
}

fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for el in paragraph.elements() {
        if is_portion(el) {
            if let Some(t) = el.child("t") {
                text.push_str(&t.text());
            }
        } else if el.is("br") {
            text.push('\n');
        }
    }
    text
}

/// Text of the `index`-th portion, plus a newline when an `a:br` follows it.
fn portion_text(paragraph: &XmlElement, index: usize) -> Option<String> {
    let pos = nth_position(paragraph, index, is_portion)?;
    let el = paragraph.element_at(pos)?;
    let mut text = el.child("t").map(|t| t.text()).unwrap_or_default();
    if paragraph.element_at(pos + 1).is_some_and(|next| next.is("br")) {
        text.push('\n');
    }
    Some(text)
}

fn body_text(body: &XmlElement) -> String {
    body.children_named("p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert position for new portions: before `a:endParaRPr`, else at the end.
fn portion_insert_position(paragraph: &XmlElement) -> usize {
    paragraph
        .position_of("endParaRPr")
        .unwrap_or(paragraph.element_count())
}

fn new_run(run_properties: Option<&XmlElement>, text: &str) -> XmlElement {
    let mut run = XmlElement::new("a:r");
    if let Some(rpr) = run_properties {
        run.append_element(rpr.clone());
    }
    run.with_child(XmlElement::new("a:t").with_text(text))
}

/// Replace a paragraph's portions with runs for `text`, keeping the first
/// portion's run properties. Newlines become `a:br`.
fn write_paragraph_text(paragraph: &mut XmlElement, text: &str) {
    let run_properties = portion_at(paragraph, 0).and_then(|r| r.child("rPr")).cloned();
    paragraph.children.retain(|n| match n {
        XmlNode::Element(e) => !(is_portion(e) || e.is("br")),
        _ => true,
    });

    let mut at = portion_insert_position(paragraph);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let mut br = XmlElement::new("a:br");
            if let Some(rpr) = &run_properties {
                br.append_element(rpr.clone());
            }
            paragraph.insert_element(at, br);
            at += 1;
        }
        if !line.is_empty() || i == 0 {
            paragraph.insert_element(at, new_run(run_properties.as_ref(), line));
            at += 1;
        }
    }
}

/// Rewrite a text body for `text`: one paragraph per line, cloned from the
/// first paragraph that has portions.
fn write_body_text(body: &mut XmlElement, text: &str) {
    let base_index = body
        .children_named("p")
        .position(|p| portion_count(p) > 0)
        .unwrap_or(0);
    let base = paragraph_at(body, base_index).cloned();
    let first_position = nth_position(body, 0, |e| e.is("p")).unwrap_or(body.element_count());
    body.remove_children("p");

    let paragraph_properties = base.as_ref().and_then(|p| p.child("pPr")).cloned();
    let run_properties = base
        .as_ref()
        .and_then(|p| portion_at(p, 0))
        .and_then(|r| r.child("rPr"))
        .cloned();
    let end_properties = base.as_ref().and_then(|p| p.child("endParaRPr")).cloned();

    for (i, line) in text.split('\n').enumerate() {
        let mut paragraph = XmlElement::new("a:p");
        if let Some(ppr) = &paragraph_properties {
            paragraph.append_element(ppr.clone());
        }
        paragraph.append_element(new_run(run_properties.as_ref(), line));
        if let Some(end) = &end_properties {
            paragraph.append_element(end.clone());
        }
        body.insert_element(first_position + i, paragraph);
    }
}

/// Check that `value` is an absolute URI: a scheme, `:`, and a non-empty
/// remainder without whitespace. Web schemes also need a host.
pub(crate) fn validate_uri(value: &str) -> Result<()> {
    let malformed = || Error::MalformedReference(format!("'{}' is not an absolute URI", value));
    let (scheme, rest) = value.split_once(':').ok_or_else(malformed)?;

    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(malformed());
    }

    if matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https" | "ftp") {
        let authority = rest.strip_prefix("//").ok_or_else(malformed)?;
        let host = authority.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(malformed());
        }
    }
    Ok(())
}

/// Inset of `a:bodyPr` in EMU, or the default margin.
fn inset_emu(body: Option<&XmlElement>, attr: &str, default_cm: f64) -> i64 {
    body.and_then(|b| b.child("bodyPr"))
        .and_then(|p| p.attr_parse::<i64>(attr))
        .unwrap_or_else(|| cm_to_emu(default_cm))
}

/// Text insets in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Insets {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

/// A text body.
#[derive(Clone)]
pub struct TextFrame<'a> {
    pres: &'a Presentation,
    location: TextLocation,
}

impl<'a> TextFrame<'a> {
    pub(crate) fn new(pres: &'a Presentation, location: TextLocation) -> Self {
        Self { pres, location }
    }

    fn body(&self) -> Option<&'a XmlElement> {
        body_of(self.pres.element(&self.location.shape).ok()?, self.location.cell)
    }

    pub fn location(&self) -> &TextLocation {
        &self.location
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        if let Some(cached) = self.pres.cache.borrow().get_text(&self.location) {
            return cached;
        }
        let text = self.body().map(body_text).unwrap_or_default();
        self.pres
            .cache
            .borrow_mut()
            .put_text(self.location.clone(), text.clone());
        text
    }

    pub fn paragraph_count(&self) -> usize {
        self.body().map_or(0, |b| b.children_named("p").count())
    }

    pub fn paragraphs(&self) -> Vec<Paragraph<'a>> {
        (0..self.paragraph_count())
            .map(|i| Paragraph::new(self.pres, self.location.clone(), i))
            .collect()
    }

    pub fn paragraph(&self, index: usize) -> Option<Paragraph<'a>> {
        (index < self.paragraph_count()).then(|| Paragraph::new(self.pres, self.location.clone(), index))
    }

    pub fn autofit(&self) -> AutofitType {
        self.body()
            .and_then(|b| b.child("bodyPr"))
            .and_then(|p| p.elements().find_map(|e| AutofitType::from_local_name(e.local_name())))
            .unwrap_or_default()
    }

    pub(crate) fn insets(&self) -> Insets {
        let body = self.body();
        Insets {
            left: inset_emu(body, "lIns", DEFAULT_LEFT_RIGHT_MARGIN_CM),
            top: inset_emu(body, "tIns", DEFAULT_TOP_BOTTOM_MARGIN_CM),
            right: inset_emu(body, "rIns", DEFAULT_LEFT_RIGHT_MARGIN_CM),
            bottom: inset_emu(body, "bIns", DEFAULT_TOP_BOTTOM_MARGIN_CM),
        }
    }

    /// Left margin in centimetres.
    pub fn left_margin(&self) -> f64 {
        emu_to_cm(self.insets().left)
    }

    pub fn right_margin(&self) -> f64 {
        emu_to_cm(self.insets().right)
    }

    pub fn top_margin(&self) -> f64 {
        emu_to_cm(self.insets().top)
    }

    pub fn bottom_margin(&self) -> f64 {
        emu_to_cm(self.insets().bottom)
    }

    /// False only for `wrap="none"`.
    pub fn wrapped(&self) -> bool {
        self.body()
            .and_then(|b| b.child("bodyPr"))
            .and_then(|p| p.attr("wrap"))
            != Some("none")
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.body()
            .and_then(|b| b.child("bodyPr"))
            .and_then(|p| p.attr("anchor"))
            .and_then(VerticalAlignment::from_ooxml)
            .unwrap_or_default()
    }
}

/// A paragraph of a text body.
#[derive(Clone)]
pub struct Paragraph<'a> {
    pres: &'a Presentation,
    location: TextLocation,
    index: usize,
}

impl<'a> Paragraph<'a> {
    fn new(pres: &'a Presentation, location: TextLocation, index: usize) -> Self {
        Self {
            pres,
            location,
            index,
        }
    }

    fn element(&self) -> Option<&'a XmlElement> {
        let body = body_of(self.pres.element(&self.location.shape).ok()?, self.location.cell)?;
        paragraph_at(body, self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> String {
        self.element().map(paragraph_text).unwrap_or_default()
    }

    /// 1-based outline level (`a:pPr/@lvl` + 1).
    pub fn level(&self) -> usize {
        self.element()
            .and_then(|p| p.child("pPr"))
            .and_then(|p| p.attr_parse::<usize>("lvl"))
            .unwrap_or(0)
            + 1
    }

    pub fn alignment(&self) -> TextAlignment {
        self.element()
            .and_then(|p| p.child("pPr"))
            .and_then(|p| p.attr("algn"))
            .and_then(TextAlignment::from_ooxml)
            .unwrap_or_default()
    }

    pub fn portion_count(&self) -> usize {
        self.element().map_or(0, portion_count)
    }

    pub fn portions(&self) -> Vec<Portion<'a>> {
        (0..self.portion_count())
            .map(|i| Portion::new(self.pres, self.portion_key(i)))
            .collect()
    }

    pub fn portion(&self, index: usize) -> Option<Portion<'a>> {
        (index < self.portion_count()).then(|| Portion::new(self.pres, self.portion_key(index)))
    }

    fn portion_key(&self, portion: usize) -> PortionKey {
        PortionKey {
            text: self.location.clone(),
            paragraph: self.index,
            portion,
        }
    }
}

/// A run or field.
#[derive(Clone)]
pub struct Portion<'a> {
    pres: &'a Presentation,
    key: PortionKey,
}

impl<'a> Portion<'a> {
    fn new(pres: &'a Presentation, key: PortionKey) -> Self {
        Self { pres, key }
    }

    fn paragraph(&self) -> Option<&'a XmlElement> {
        let body = body_of(self.pres.element(&self.key.text.shape).ok()?, self.key.text.cell)?;
        paragraph_at(body, self.key.paragraph)
    }

    fn element(&self) -> Option<&'a XmlElement> {
        portion_at(self.paragraph()?, self.key.portion)
    }

    pub fn key(&self) -> &PortionKey {
        &self.key
    }

    pub fn text(&self) -> String {
        self.paragraph()
            .and_then(|p| portion_text(p, self.key.portion))
            .unwrap_or_default()
    }

    pub fn font(&self) -> Font<'a> {
        Font::new(self.pres, self.key.clone())
    }

    /// Target of the click hyperlink.
    pub fn hyperlink(&self) -> Option<String> {
        let rel_id = self.element()?.path(&["rPr", "hlinkClick"])?.attr("r:id")?;
        let part = self.pres.part(self.key.text.shape.part).ok()?;
        part.rels.get(rel_id).map(|r| r.target.clone())
    }

    /// Hex highlight colour.
    pub fn highlight_color(&self) -> Option<String> {
        self.element()?
            .path(&["rPr", "highlight", "srgbClr"])?
            .attr("val")
            .map(str::to_ascii_uppercase)
    }

    /// Field kind for `a:fld` portions.
    pub fn field_type(&self) -> Option<FieldType> {
        let el = self.element()?;
        if !el.is("fld") {
            return None;
        }
        el.attr("type").map(FieldType::from_ooxml)
    }
}

/// Editable text body.
pub struct TextFrameMut<'a> {
    pres: &'a mut Presentation,
    location: TextLocation,
}

impl<'a> TextFrameMut<'a> {
    pub(crate) fn new(pres: &'a mut Presentation, location: TextLocation) -> Self {
        Self { pres, location }
    }

    pub fn as_frame(&self) -> TextFrame<'_> {
        TextFrame::new(self.pres, self.location.clone())
    }

    fn body_mut(&mut self) -> Result<&mut XmlElement> {
        let location = &self.location;
        let shape_el = self.pres.element_mut(&location.shape)?;
        body_mut_of(shape_el, location.cell)
            .ok_or_else(|| Error::MissingComponent(format!("{}: text body", location.shape)))
    }

    fn body_properties_mut(&mut self) -> Result<&mut XmlElement> {
        Ok(self.body_mut()?.ensure_child_at("a:bodyPr", 0))
    }

    /// Replace the text. Each line becomes a paragraph; autofit runs afterwards.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        write_body_text(self.body_mut()?, &normalized);
        debug!(
            "{}: text set, {} paragraph(s)",
            self.location.shape,
            normalized.split('\n').count()
        );
        self.apply_autofit()
    }

    fn apply_autofit(&mut self) -> Result<()> {
        match self.as_frame().autofit() {
            AutofitType::Shrink => autofit::shrink(&mut *self.pres, &self.location),
            AutofitType::Resize => autofit::resize(&mut *self.pres, &self.location),
            AutofitType::None => Ok(()),
        }
    }

    /// Switch the autofit mode. Switching to [`AutofitType::Resize`] resizes now.
    pub fn set_autofit(&mut self, autofit: AutofitType) -> Result<()> {
        if self.as_frame().autofit() == autofit {
            return Ok(());
        }
        let body_pr = self.body_properties_mut()?;
        for name in ["noAutofit", "normAutofit", "spAutoFit"] {
            body_pr.remove_children(name);
        }
        body_pr.ensure_child_ordered(autofit.element_name(), BODY_PROPERTIES_ORDER);

        if autofit == AutofitType::Resize {
            autofit::resize(&mut *self.pres, &self.location)?;
        }
        Ok(())
    }

    fn set_inset(&mut self, attr: &str, cm: f64) -> Result<()> {
        if !(cm >= 0.0 && cm.is_finite()) {
            return Err(Error::InvalidMutation(format!("margin {} cm", cm)));
        }
        self.body_properties_mut()?.set_attr(attr, cm_to_emu(cm).to_string());
        Ok(())
    }

    pub fn set_left_margin(&mut self, cm: f64) -> Result<()> {
        self.set_inset("lIns", cm)
    }

    pub fn set_right_margin(&mut self, cm: f64) -> Result<()> {
        self.set_inset("rIns", cm)
    }

    pub fn set_top_margin(&mut self, cm: f64) -> Result<()> {
        self.set_inset("tIns", cm)
    }

    pub fn set_bottom_margin(&mut self, cm: f64) -> Result<()> {
        self.set_inset("bIns", cm)
    }

    pub fn set_wrapped(&mut self, wrapped: bool) -> Result<()> {
        self.body_properties_mut()?
            .set_attr("wrap", if wrapped { "square" } else { "none" });
        Ok(())
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) -> Result<()> {
        self.body_properties_mut()?
            .set_attr("anchor", alignment.as_ooxml());
        Ok(())
    }

    /// Default run size, in points, of outline `level` (1-based) in the
    /// frame's own list style. Slide shapes that inherit from this frame
    /// pick it up.
    pub fn set_level_font_size(&mut self, level: usize, points: f64) -> Result<()> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(Error::InvalidMutation(format!("outline level {}", level)));
        }
        if !(points > 0.0 && points.is_finite()) {
            return Err(Error::InvalidMutation(format!("font size {}", points)));
        }
        let level_name = format!("a:lvl{}pPr", level);
        self.body_mut()?
            .ensure_child_ordered("a:lstStyle", TEXT_BODY_ORDER)
            .ensure_child_ordered(&level_name, LIST_STYLE_ORDER)
            .ensure_child_ordered("a:defRPr", PARAGRAPH_PROPERTIES_ORDER)
            .set_attr("sz", ((points * 100.0).round() as i64).to_string());
        Ok(())
    }

    /// Append a paragraph formatted like the last one; returns its index.
    pub fn add_paragraph(&mut self, text: &str) -> Result<usize> {
        let body = self.body_mut()?;
        let count = body.children_named("p").count();
        let last = count.checked_sub(1).and_then(|i| paragraph_at(body, i));

        let mut paragraph = XmlElement::new("a:p");
        if let Some(ppr) = last.and_then(|p| p.child("pPr")) {
            paragraph.append_element(ppr.clone());
        }
        let run_properties = last
            .and_then(|p| portion_at(p, 0))
            .and_then(|r| r.child("rPr"))
            .cloned();
        paragraph.append_element(new_run(run_properties.as_ref(), ""));
        write_paragraph_text(&mut paragraph, text);

        let at = match count.checked_sub(1).and_then(|i| nth_position(body, i, |e| e.is("p"))) {
            Some(pos) => pos + 1,
            None => body.element_count(),
        };
        body.insert_element(at, paragraph);
        Ok(count)
    }

    /// Remove a paragraph. The last remaining paragraph cannot be removed.
    pub fn remove_paragraph(&mut self, index: usize) -> Result<()> {
        let shape = self.location.shape.clone();
        let body = self.body_mut()?;
        if body.children_named("p").count() <= 1 {
            return Err(Error::InvalidMutation(format!(
                "{}: a text body keeps at least one paragraph",
                shape
            )));
        }
        let pos = nth_position(body, index, |e| e.is("p"))
            .ok_or_else(|| Error::InvalidData(format!("{}: paragraph {}", shape, index)))?;
        body.remove_element(pos);
        Ok(())
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Result<ParagraphMut<'_>> {
        if index >= self.as_frame().paragraph_count() {
            return Err(Error::InvalidData(format!(
                "{}: paragraph {}",
                self.location.shape, index
            )));
        }
        Ok(ParagraphMut {
            pres: &mut *self.pres,
            location: self.location.clone(),
            index,
        })
    }
}

/// Editable paragraph.
pub struct ParagraphMut<'a> {
    pres: &'a mut Presentation,
    location: TextLocation,
    index: usize,
}

impl<'a> ParagraphMut<'a> {
    pub(crate) fn new(pres: &'a mut Presentation, location: TextLocation, index: usize) -> Self {
        Self {
            pres,
            location,
            index,
        }
    }

    fn element_mut(&mut self) -> Result<&mut XmlElement> {
        let location = &self.location;
        let shape_el = self.pres.element_mut(&location.shape)?;
        body_mut_of(shape_el, location.cell)
            .and_then(|b| paragraph_at_mut(b, self.index))
            .ok_or_else(|| {
                Error::InvalidData(format!("{}: paragraph {}", location.shape, self.index))
            })
    }

    pub fn as_paragraph(&self) -> Paragraph<'_> {
        Paragraph::new(self.pres, self.location.clone(), self.index)
    }

    /// Replace the paragraph's portions with a single run (newlines become breaks).
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        write_paragraph_text(self.element_mut()?, &normalized);
        Ok(())
    }

    /// Set the 1-based outline level (1..=9).
    pub fn set_level(&mut self, level: usize) -> Result<()> {
        if !(1..=9).contains(&level) {
            return Err(Error::InvalidMutation(format!("outline level {}", level)));
        }
        let ppr = self.element_mut()?.ensure_child_at("a:pPr", 0);
        if level == 1 {
            ppr.remove_attr("lvl");
        } else {
            ppr.set_attr("lvl", (level - 1).to_string());
        }
        Ok(())
    }

    pub fn set_alignment(&mut self, alignment: TextAlignment) -> Result<()> {
        self.element_mut()?
            .ensure_child_at("a:pPr", 0)
            .set_attr("algn", alignment.as_ooxml());
        Ok(())
    }

    /// Set the size of every portion and of the end-of-paragraph run
    /// properties, in points.
    pub fn set_font_size(&mut self, points: f64) -> Result<()> {
        if !(points > 0.0 && points.is_finite()) {
            return Err(Error::InvalidMutation(format!("font size {}", points)));
        }
        let hundredths = ((points * 100.0).round() as i64).to_string();
        for el in self.element_mut()?.elements_mut() {
            if is_portion(el) {
                el.ensure_child_at("a:rPr", 0).set_attr("sz", hundredths.clone());
            } else if el.is("endParaRPr") {
                el.set_attr("sz", hundredths.clone());
            }
        }
        Ok(())
    }

    /// Append a run formatted like the last portion; returns its index.
    pub fn add_portion(&mut self, text: &str) -> Result<usize> {
        let paragraph = self.element_mut()?;
        let count = portion_count(paragraph);
        let run_properties = count
            .checked_sub(1)
            .and_then(|i| portion_at(paragraph, i))
            .and_then(|r| r.child("rPr"))
            .cloned();
        let at = portion_insert_position(paragraph);
        paragraph.insert_element(at, new_run(run_properties.as_ref(), text));
        Ok(count)
    }

    /// Remove a portion along with a line break directly after it.
    pub fn remove_portion(&mut self, index: usize) -> Result<()> {
        let shape = self.location.shape.clone();
        let paragraph = self.element_mut()?;
        let pos = nth_position(paragraph, index, is_portion)
            .ok_or_else(|| Error::InvalidData(format!("{}: portion {}", shape, index)))?;
        paragraph.remove_element(pos);
        if paragraph.element_at(pos).is_some_and(|e| e.is("br")) {
            paragraph.remove_element(pos);
        }
        Ok(())
    }

    pub fn portion_mut(&mut self, index: usize) -> Result<PortionMut<'_>> {
        if index >= self.as_paragraph().portion_count() {
            return Err(Error::InvalidData(format!(
                "{}: portion {}",
                self.location.shape, index
            )));
        }
        Ok(PortionMut {
            pres: &mut *self.pres,
            key: PortionKey {
                text: self.location.clone(),
                paragraph: self.index,
                portion: index,
            },
        })
    }
}

/// Editable portion.
pub struct PortionMut<'a> {
    pres: &'a mut Presentation,
    key: PortionKey,
}

impl<'a> PortionMut<'a> {
    fn element_mut(&mut self) -> Result<&mut XmlElement> {
        let key = &self.key;
        let shape_el = self.pres.element_mut(&key.text.shape)?;
        body_mut_of(shape_el, key.text.cell)
            .and_then(|b| portion_at_mut(b, key.paragraph, key.portion))
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "{}: portion {}/{}",
                    key.text.shape, key.paragraph, key.portion
                ))
            })
    }

    pub fn as_portion(&self) -> Portion<'_> {
        Portion::new(self.pres, self.key.clone())
    }

    pub fn font_mut(&mut self) -> FontMut<'_> {
        FontMut::new(&mut *self.pres, self.key.clone())
    }

    /// Replace the portion's text (`a:t`).
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let el = self.element_mut()?;
        match el.child_mut("t") {
            Some(t) => t.set_text(text),
            None => {
                el.append_element(XmlElement::new("a:t").with_text(text));
            }
        }
        Ok(())
    }

    /// Set or clear the click hyperlink. The URI is validated before anything
    /// is written.
    pub fn set_hyperlink(&mut self, uri: Option<&str>) -> Result<()> {
        let Some(uri) = uri else {
            let el = self.element_mut()?;
            if let Some(rpr) = el.child_mut("rPr") {
                rpr.remove_children("hlinkClick");
            }
            return Ok(());
        };
        validate_uri(uri)?;
        // the portion must exist before a relationship is added
        self.element_mut()?;

        let part = self.pres.part_mut(self.key.text.shape.part)?;
        let rel_id = part.rels.add_new(rel_types::HYPERLINK, uri, true);
        part.rels_dirty = true;

        let rpr = self.element_mut()?.ensure_child_at("a:rPr", 0);
        rpr.remove_children("hlinkClick");
        rpr.ensure_child_ordered("a:hlinkClick", RUN_PROPERTIES_ORDER)
            .set_attr("r:id", rel_id);
        Ok(())
    }

    /// Set the highlight colour from a 6-digit hex value.
    pub fn set_highlight_color(&mut self, hex: &str) -> Result<()> {
        let hex = parse_hex_color(hex)?;
        let rpr = self.element_mut()?.ensure_child_at("a:rPr", 0);
        let highlight = rpr.ensure_child_ordered("a:highlight", RUN_PROPERTIES_ORDER);
        highlight.children.clear();
        highlight.append_element(XmlElement::new("a:srgbClr").with_attr("val", hex));
        Ok(())
    }
}
