//! Shape views: identity, resolved geometry and typed sub-views.
//!
//! Positions and sizes are exposed in pixels at the configured DPI and are
//! stored in EMU. `x`/`y` are slide coordinates even for grouped shapes.

use super::chart::Chart;
use super::fill::{
    load_embedded, properties_of_mut, write_no_fill, write_no_outline, write_outline_color,
    write_outline_weight, write_solid_fill, parse_hex_color, ShapeFill, ShapeOutline,
};
use super::group::{apply_propagation, plan_propagation};
use super::presentation::Presentation;
use super::resolve::{
    ancestor_transforms, geometry_type, referenced_shape, resolved_box, slide_offset,
    slide_to_local,
};
use super::slide::child_keys;
use super::table::{Table, TableMut};
use super::text::{TextFrame, TextFrameMut, TextLocation};
use crate::error::{Error, Result};
use crate::model::{GeometryType, Placeholder, ResolvedBox, Resource, ShapeKey, ShapeKind};
use crate::units::{emu_to_px, px_to_emu};
use crate::xml::XmlElement;
use log::debug;

/// `cNvPr` of a shape element (`p:nvSpPr/p:cNvPr`, `p:nvPicPr/p:cNvPr`, ...).
fn non_visual_of(el: &XmlElement) -> Option<&XmlElement> {
    el.elements()
        .find(|e| e.local_name().starts_with("nv"))?
        .child("cNvPr")
}

fn non_visual_of_mut(el: &mut XmlElement) -> Option<&mut XmlElement> {
    el.elements_mut()
        .find(|e| e.local_name().starts_with("nv"))?
        .child_mut("cNvPr")
}

/// Write a shape's offset and extent in its local space, creating the
/// transform when the shape only inherited one, and grow the enclosing
/// groups to keep containing it.
pub(crate) fn write_box(pres: &mut Presentation, key: &ShapeKey, new_box: &ResolvedBox) -> Result<()> {
    let updates = plan_propagation(pres, key, new_box)?;

    let el = pres.element_mut(key)?;
    let kind = ShapeKind::from_element(el).ok_or_else(|| Error::ShapeNotFound(key.to_string()))?;
    let xfrm = match kind.properties_element() {
        "xfrm" => el.ensure_child_at("p:xfrm", 1),
        props => {
            let at = super::fill::properties_index(el);
            el.ensure_child_at(&format!("p:{}", props), at)
                .ensure_child_at("a:xfrm", 0)
        }
    };

    if let Some((x, y)) = new_box.offset {
        let off = xfrm.ensure_child_at("a:off", 0);
        off.set_attr("x", x.to_string());
        off.set_attr("y", y.to_string());
    }
    let at = xfrm.position_of("off").map_or(0, |p| p + 1);
    let ext = xfrm.ensure_child_at("a:ext", at);
    ext.set_attr("cx", new_box.extent.0.to_string());
    ext.set_attr("cy", new_box.extent.1.to_string());

    debug!("{}: box {:?}", key, new_box);
    apply_propagation(pres, &updates)
}

/// Read view of a shape.
#[derive(Clone)]
pub struct Shape<'a> {
    pres: &'a Presentation,
    key: ShapeKey,
    kind: ShapeKind,
}

impl std::fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("name", &self.name())
            .finish()
    }
}

impl<'a> Shape<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: ShapeKey) -> Result<Self> {
        let kind = ShapeKind::from_element(pres.element(&key)?)
            .ok_or_else(|| Error::ShapeNotFound(key.to_string()))?;
        Ok(Self { pres, key, kind })
    }

    fn element(&self) -> Option<&'a XmlElement> {
        self.pres.element(&self.key).ok()
    }

    fn non_visual(&self) -> Option<&'a XmlElement> {
        non_visual_of(self.element()?)
    }

    pub fn key(&self) -> &ShapeKey {
        &self.key
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// `cNvPr/@id`, 0 when missing.
    pub fn id(&self) -> u32 {
        self.non_visual()
            .and_then(|nv| nv.attr_parse("id"))
            .unwrap_or(0)
    }

    pub fn name(&self) -> String {
        self.non_visual()
            .and_then(|nv| nv.attr("name"))
            .unwrap_or_default()
            .to_string()
    }

    pub fn hidden(&self) -> bool {
        self.non_visual()
            .and_then(|nv| nv.attr_bool("hidden"))
            .unwrap_or(false)
    }

    /// Alternative text (`cNvPr/@descr`).
    pub fn alt_text(&self) -> Option<String> {
        self.non_visual()?
            .attr("descr")
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        Placeholder::of_shape(self.element()?)
    }

    /// Offset in slide space, in EMU.
    pub fn offset_emu(&self) -> Result<(i64, i64)> {
        slide_offset(self.pres, &self.key)
    }

    /// Extent in EMU, inherited through placeholders.
    pub fn extent_emu(&self) -> Result<(i64, i64)> {
        Ok(resolved_box(self.pres, &self.key)?.extent)
    }

    /// Left edge in slide pixels.
    pub fn x(&self) -> Result<i64> {
        Ok(emu_to_px(self.offset_emu()?.0, self.pres.options().horizontal_dpi))
    }

    /// Top edge in slide pixels.
    pub fn y(&self) -> Result<i64> {
        Ok(emu_to_px(self.offset_emu()?.1, self.pres.options().vertical_dpi))
    }

    pub fn width(&self) -> Result<i64> {
        Ok(emu_to_px(self.extent_emu()?.0, self.pres.options().horizontal_dpi))
    }

    pub fn height(&self) -> Result<i64> {
        Ok(emu_to_px(self.extent_emu()?.1, self.pres.options().vertical_dpi))
    }

    pub fn geometry_type(&self) -> Result<GeometryType> {
        geometry_type(self.pres, &self.key)
    }

    /// The group this shape sits in.
    pub fn parent_group(&self) -> Option<Shape<'a>> {
        Shape::new(self.pres, self.key.parent()?).ok()
    }

    /// Child shapes of a group; empty for other kinds.
    pub fn shapes(&self) -> Vec<Shape<'a>> {
        if self.kind != ShapeKind::Group {
            return Vec::new();
        }
        child_keys(self.pres, self.key.part, Some(&self.key))
            .into_iter()
            .filter_map(|k| Shape::new(self.pres, k).ok())
            .collect()
    }

    /// The layout or master placeholder this shape inherits from.
    pub fn referenced_shape(&self) -> Option<Shape<'a>> {
        Shape::new(self.pres, referenced_shape(self.pres, &self.key)?).ok()
    }

    pub fn text_frame(&self) -> Option<TextFrame<'a>> {
        if !self.kind.has_text_frame() {
            return None;
        }
        self.element()?.child("txBody")?;
        Some(TextFrame::new(self.pres, TextLocation::shape(self.key.clone())))
    }

    pub fn fill(&self) -> ShapeFill<'a> {
        ShapeFill::new(self.pres, self.key.clone())
    }

    pub fn outline(&self) -> ShapeOutline<'a> {
        ShapeOutline::new(self.pres, self.key.clone())
    }

    pub fn table(&self) -> Option<Table<'a>> {
        (self.kind == ShapeKind::Table).then(|| Table::new(self.pres, self.key.clone()))
    }

    pub fn chart(&self) -> Option<Chart<'a>> {
        (self.kind == ShapeKind::Chart).then(|| Chart::new(self.pres, self.key.clone()))
    }

    /// Image of a picture (or the poster frame of a media shape).
    pub fn image(&self) -> Result<Option<Resource>> {
        if !matches!(self.kind, ShapeKind::Picture | ShapeKind::Media) {
            return Ok(None);
        }
        let Some(blip) = self.element().and_then(|el| el.path(&["blipFill", "blip"])) else {
            return Ok(None);
        };
        load_embedded(self.pres, self.key.part, blip).map(Some)
    }

    /// Audio or video of a media shape. The embedded `p14:media` part wins
    /// over the `a:videoFile`/`a:audioFile` link.
    pub fn media(&self) -> Result<Option<Resource>> {
        if self.kind != ShapeKind::Media {
            return Ok(None);
        }
        let Some(nv_pr) = self.element().and_then(|el| el.path(&["nvPicPr", "nvPr"])) else {
            return Ok(None);
        };
        let source = nv_pr
            .descendant("p14:media")
            .or_else(|| nv_pr.child("videoFile"))
            .or_else(|| nv_pr.child("audioFile"));
        match source {
            Some(el) => load_embedded(self.pres, self.key.part, el).map(Some),
            None => Ok(None),
        }
    }
}

/// Mutable view of a shape.
pub struct ShapeMut<'a> {
    pres: &'a mut Presentation,
    key: ShapeKey,
    kind: ShapeKind,
}

impl<'a> ShapeMut<'a> {
    pub(crate) fn new(pres: &'a mut Presentation, key: ShapeKey) -> Result<Self> {
        let kind = ShapeKind::from_element(pres.element(&key)?)
            .ok_or_else(|| Error::ShapeNotFound(key.to_string()))?;
        Ok(Self { pres, key, kind })
    }

    pub fn as_shape(&self) -> Shape<'_> {
        Shape {
            pres: &*self.pres,
            key: self.key.clone(),
            kind: self.kind,
        }
    }

    fn non_visual_mut(&mut self) -> Result<&mut XmlElement> {
        let key = self.key.clone();
        non_visual_of_mut(self.pres.element_mut(&key)?)
            .ok_or_else(|| Error::MissingComponent(format!("{}: cNvPr", key)))
    }

    /// Move to slide coordinates; `None` keeps the current value.
    fn move_to(&mut self, x: Option<i64>, y: Option<i64>) -> Result<()> {
        let current = resolved_box(self.pres, &self.key)?;
        let (slide_x, slide_y) = slide_offset(self.pres, &self.key)?;
        let ancestors = ancestor_transforms(self.pres, &self.key)?;
        let local = slide_to_local(&ancestors, (x.unwrap_or(slide_x), y.unwrap_or(slide_y)));
        let new_box = ResolvedBox {
            offset: Some(local),
            extent: current.extent,
        };
        write_box(self.pres, &self.key, &new_box)
    }

    /// Set the left edge in slide pixels. Enclosing groups grow to contain
    /// the shape.
    pub fn set_x(&mut self, px: i64) -> Result<()> {
        let emu = px_to_emu(px, self.pres.options().horizontal_dpi);
        self.move_to(Some(emu), None)
    }

    /// Set the top edge in slide pixels.
    pub fn set_y(&mut self, px: i64) -> Result<()> {
        let emu = px_to_emu(px, self.pres.options().vertical_dpi);
        self.move_to(None, Some(emu))
    }

    fn resize(&mut self, width: Option<i64>, height: Option<i64>) -> Result<()> {
        if self.key.is_grouped() {
            return Err(Error::InvalidMutation(format!(
                "{}: cannot resize a shape inside a group",
                self.key
            )));
        }
        if self.kind == ShapeKind::Group {
            return Err(Error::InvalidMutation(format!("{}: cannot resize a group", self.key)));
        }

        let current = resolved_box(self.pres, &self.key)?;
        if current.offset.is_none() {
            return Err(Error::ResolutionExhausted(format!(
                "{} has no transform and is not a placeholder",
                self.key
            )));
        }
        let new_box = ResolvedBox {
            offset: current.offset,
            extent: (
                width.unwrap_or(current.extent.0),
                height.unwrap_or(current.extent.1),
            ),
        };
        write_box(self.pres, &self.key, &new_box)
    }

    /// Set the width in pixels. Not allowed inside groups or on groups.
    pub fn set_width(&mut self, px: i64) -> Result<()> {
        let emu = px_to_emu(px, self.pres.options().horizontal_dpi);
        self.resize(Some(emu), None)
    }

    /// Set the height in pixels. Not allowed inside groups or on groups.
    pub fn set_height(&mut self, px: i64) -> Result<()> {
        let emu = px_to_emu(px, self.pres.options().vertical_dpi);
        self.resize(None, Some(emu))
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.non_visual_mut()?.set_attr("name", name);
        Ok(())
    }

    pub fn set_hidden(&mut self, hidden: bool) -> Result<()> {
        let nv = self.non_visual_mut()?;
        if hidden {
            nv.set_attr("hidden", "1");
        } else {
            nv.remove_attr("hidden");
        }
        Ok(())
    }

    pub fn set_alt_text(&mut self, text: &str) -> Result<()> {
        self.non_visual_mut()?.set_attr("descr", text);
        Ok(())
    }

    fn properties_mut(&mut self) -> Result<&mut XmlElement> {
        let key = self.key.clone();
        properties_of_mut(self.pres.element_mut(&key)?)
    }

    /// Replace the fill with a solid colour (`RRGGBB`, optional `#`).
    pub fn set_fill_color(&mut self, hex: &str) -> Result<()> {
        let hex = parse_hex_color(hex)?;
        write_solid_fill(self.properties_mut()?, &hex);
        Ok(())
    }

    pub fn set_no_fill(&mut self) -> Result<()> {
        write_no_fill(self.properties_mut()?);
        Ok(())
    }

    /// Outline weight in points.
    pub fn set_outline_weight(&mut self, points: f64) -> Result<()> {
        if !points.is_finite() || points < 0.0 {
            return Err(Error::InvalidMutation(format!("outline weight {}", points)));
        }
        write_outline_weight(self.properties_mut()?, points);
        Ok(())
    }

    pub fn set_outline_color(&mut self, hex: &str) -> Result<()> {
        let hex = parse_hex_color(hex)?;
        write_outline_color(self.properties_mut()?, &hex);
        Ok(())
    }

    pub fn set_no_outline(&mut self) -> Result<()> {
        write_no_outline(self.properties_mut()?);
        Ok(())
    }

    /// Editable text frame. Auto shapes without one get an empty body.
    pub fn text_frame_mut(&mut self) -> Result<TextFrameMut<'_>> {
        if !self.kind.has_text_frame() {
            return Err(Error::InvalidMutation(format!("{}: no text frame", self.key)));
        }
        let key = self.key.clone();
        let el = self.pres.element_mut(&key)?;
        if el.child("txBody").is_none() {
            let at = el.position_of("extLst").unwrap_or(el.element_count());
            el.insert_element(
                at,
                XmlElement::new("p:txBody")
                    .with_child(XmlElement::new("a:bodyPr"))
                    .with_child(XmlElement::new("a:lstStyle"))
                    .with_child(XmlElement::new("a:p")),
            );
        }
        Ok(TextFrameMut::new(&mut *self.pres, TextLocation::shape(key)))
    }

    pub fn table_mut(&mut self) -> Result<TableMut<'_>> {
        if self.kind != ShapeKind::Table {
            return Err(Error::InvalidMutation(format!("{}: not a table", self.key)));
        }
        Ok(TableMut::new(&mut *self.pres, self.key.clone()))
    }
}
