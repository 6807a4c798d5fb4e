//! Slide, layout and master views.

use super::presentation::Presentation;
use super::shape::Shape;
use super::theme::Theme;
use crate::model::{PartRef, ShapeKey, ShapeKind};
use crate::xml::XmlElement;

/// Keys of the shapes directly under `parent` (the shape tree root when `None`).
pub(crate) fn child_keys(pres: &Presentation, part: PartRef, parent: Option<&ShapeKey>) -> Vec<ShapeKey> {
    let container = match parent {
        Some(key) => pres.element(key).ok(),
        None => pres.part(part).and_then(|p| p.shape_tree()).ok(),
    };
    let Some(container) = container else {
        return Vec::new();
    };

    container
        .elements()
        .enumerate()
        .filter(|(_, el)| ShapeKind::from_element(el).is_some())
        .map(|(i, _)| match parent {
            Some(key) => key.child(i),
            None => ShapeKey::top_level(part, i),
        })
        .collect()
}

/// All shape keys of a part, depth first in document order.
pub(crate) fn all_keys(pres: &Presentation, part: PartRef) -> Vec<ShapeKey> {
    fn walk(pres: &Presentation, part: PartRef, parent: Option<&ShapeKey>, out: &mut Vec<ShapeKey>) {
        for key in child_keys(pres, part, parent) {
            let is_group = pres
                .element(&key)
                .ok()
                .and_then(ShapeKind::from_element)
                == Some(ShapeKind::Group);
            out.push(key.clone());
            if is_group {
                walk(pres, part, Some(&key), out);
            }
        }
    }

    let mut out = Vec::new();
    walk(pres, part, None, &mut out);
    out
}

fn shapes_of(pres: &Presentation, part: PartRef) -> Vec<Shape<'_>> {
    child_keys(pres, part, None)
        .into_iter()
        .filter_map(|k| Shape::new(pres, k).ok())
        .collect()
}

fn find_by_name<'a>(pres: &'a Presentation, part: PartRef, name: &str) -> Option<Shape<'a>> {
    all_keys(pres, part)
        .into_iter()
        .filter_map(|k| Shape::new(pres, k).ok())
        .find(|s| s.name() == name)
}

fn find_by_id(pres: &Presentation, part: PartRef, id: u32) -> Option<Shape<'_>> {
    all_keys(pres, part)
        .into_iter()
        .filter_map(|k| Shape::new(pres, k).ok())
        .find(|s| s.id() == id)
}

fn common_slide_name(root: &XmlElement) -> Option<String> {
    root.child("cSld")
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// A slide.
#[derive(Clone, Copy)]
pub struct Slide<'a> {
    pres: &'a Presentation,
    index: usize,
}

impl<'a> Slide<'a> {
    pub(crate) fn new(pres: &'a Presentation, index: usize) -> Self {
        Self { pres, index }
    }

    /// 0-based position in the presentation.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based slide number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Part reference for building shape keys.
    pub fn part(&self) -> PartRef {
        PartRef::Slide(self.index)
    }

    /// `p:sldId/@id` of the slide.
    pub fn slide_id(&self) -> u32 {
        self.pres.slides[self.index].id
    }

    /// Package path of the slide part.
    pub fn part_path(&self) -> &'a str {
        &self.pres.slides[self.index].xml.path
    }

    /// Whether the slide is hidden in slide shows (`p:sld/@show="0"`).
    pub fn hidden(&self) -> bool {
        self.pres.slides[self.index].xml.root.attr_bool("show") == Some(false)
    }

    /// The layout this slide is based on.
    pub fn layout(&self) -> Option<SlideLayout<'a>> {
        self.pres.slides[self.index]
            .layout
            .map(|l| SlideLayout::new(self.pres, l))
    }

    /// Top-level shapes in document order.
    pub fn shapes(&self) -> Vec<Shape<'a>> {
        shapes_of(self.pres, self.part())
    }

    /// Every shape including those inside groups, depth first.
    pub fn all_shapes(&self) -> Vec<Shape<'a>> {
        all_keys(self.pres, self.part())
            .into_iter()
            .filter_map(|k| Shape::new(self.pres, k).ok())
            .collect()
    }

    /// First shape with the given name, searching inside groups.
    pub fn shape_by_name(&self, name: &str) -> Option<Shape<'a>> {
        find_by_name(self.pres, self.part(), name)
    }

    /// Shape with the given `cNvPr/@id`.
    pub fn shape_by_id(&self, id: u32) -> Option<Shape<'a>> {
        find_by_id(self.pres, self.part(), id)
    }

    /// Slide text: the text of every text frame, one frame per line.
    pub fn text(&self) -> String {
        self.all_shapes()
            .iter()
            .filter_map(|s| s.text_frame())
            .map(|tf| tf.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A slide layout.
#[derive(Clone, Copy)]
pub struct SlideLayout<'a> {
    pres: &'a Presentation,
    index: usize,
}

impl<'a> SlideLayout<'a> {
    pub(crate) fn new(pres: &'a Presentation, index: usize) -> Self {
        Self { pres, index }
    }

    /// Position in the presentation's layout list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Part reference for building shape keys.
    pub fn part(&self) -> PartRef {
        PartRef::Layout(self.index)
    }

    /// Layout name (`p:cSld/@name`).
    pub fn name(&self) -> Option<String> {
        common_slide_name(&self.pres.layouts[self.index].xml.root)
    }

    /// Layout type (`p:sldLayout/@type`), e.g. `title` or `obj`.
    pub fn layout_type(&self) -> Option<&'a str> {
        self.pres.layouts[self.index].xml.root.attr("type")
    }

    /// The owning master.
    pub fn master(&self) -> SlideMaster<'a> {
        SlideMaster::new(self.pres, self.pres.layouts[self.index].master)
    }

    /// Top-level shapes in document order.
    pub fn shapes(&self) -> Vec<Shape<'a>> {
        shapes_of(self.pres, self.part())
    }

    /// First shape with the given name.
    pub fn shape_by_name(&self, name: &str) -> Option<Shape<'a>> {
        find_by_name(self.pres, self.part(), name)
    }
}

/// A slide master.
#[derive(Clone, Copy)]
pub struct SlideMaster<'a> {
    pres: &'a Presentation,
    index: usize,
}

impl<'a> SlideMaster<'a> {
    pub(crate) fn new(pres: &'a Presentation, index: usize) -> Self {
        Self { pres, index }
    }

    /// Position in the master list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Part reference for building shape keys.
    pub fn part(&self) -> PartRef {
        PartRef::Master(self.index)
    }

    /// Master name (`p:cSld/@name`).
    pub fn name(&self) -> Option<String> {
        common_slide_name(&self.pres.masters[self.index].xml.root)
    }

    /// Theme of this master.
    pub fn theme(&self) -> &'a Theme {
        &self.pres.masters[self.index].theme
    }

    /// Layouts owned by this master.
    pub fn layouts(&self) -> Vec<SlideLayout<'a>> {
        self.pres
            .layouts
            .iter()
            .enumerate()
            .filter(|(_, l)| l.master == self.index)
            .map(|(i, _)| SlideLayout::new(self.pres, i))
            .collect()
    }

    /// Top-level shapes in document order.
    pub fn shapes(&self) -> Vec<Shape<'a>> {
        shapes_of(self.pres, self.part())
    }

    /// First shape with the given name.
    pub fn shape_by_name(&self, name: &str) -> Option<Shape<'a>> {
        find_by_name(self.pres, self.part(), name)
    }
}
