//! Presentation root: package loading, part access, slide collection edits and saving.

use super::cache::ResolveCache;
use super::font::FontProps;
use super::metrics::{ApproximateMetrics, GlyphMetrics};
use super::part::{rel_types, XmlPart, SLIDE_CONTENT_TYPE};
use super::sections::{self, Section};
use super::shape::{Shape, ShapeMut};
use super::slide::{Slide, SlideLayout, SlideMaster};
use super::styles;
use super::theme::{ColorMap, Theme};
use crate::container::{OoxmlContainer, PackageChanges, Relationships};
use crate::error::{Error, Result};
use crate::model::{PartRef, ShapeKey};
use crate::options::PresentationOptions;
use crate::units::emu_to_px;
use crate::xml::XmlElement;
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);
const FIRST_SLIDE_ID: u32 = 256;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

pub(crate) struct MasterEntry {
    pub xml: XmlPart,
    pub theme: Theme,
    pub color_map: ColorMap,
}

pub(crate) struct LayoutEntry {
    pub xml: XmlPart,
    pub master: usize,
}

pub(crate) struct SlideEntry {
    pub xml: XmlPart,
    pub layout: Option<usize>,
    /// `p:sldId/@r:id` in the presentation part
    pub rel_id: String,
    /// `p:sldId/@id`
    pub id: u32,
}

/// An open presentation.
///
/// Reads go through shared views ([`Shape`], [`Slide`], ...) that resolve
/// inherited values lazily and memoize them; writes go through mutable views
/// ([`ShapeMut`]) and invalidate what they may have affected.
pub struct Presentation {
    container: OoxmlContainer,
    options: PresentationOptions,
    metrics: Box<dyn GlyphMetrics>,
    pub(crate) main: XmlPart,
    content_types: XmlPart,
    pub(crate) masters: Vec<MasterEntry>,
    pub(crate) layouts: Vec<LayoutEntry>,
    pub(crate) slides: Vec<SlideEntry>,
    level_fonts: BTreeMap<usize, FontProps>,
    removed: Vec<String>,
    pub(crate) cache: RefCell<ResolveCache>,
}

/// Relationship id attribute (`r:id`) of a list entry such as `p:sldId`.
pub(crate) fn rel_id_attr(el: &XmlElement) -> Option<&str> {
    el.attributes
        .iter()
        .find(|(k, _)| k.ends_with(":id"))
        .map(|(_, v)| v.as_str())
}

fn id_list_rel_ids(root: &XmlElement, list: &str) -> Vec<String> {
    root.child(list)
        .map(|l| {
            l.elements()
                .filter_map(rel_id_attr)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Presentation {
    /// Open a presentation from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use slidekit::Presentation;
    ///
    /// let pres = Presentation::open("deck.pptx")?;
    /// for slide in pres.slides() {
    ///     for shape in slide.shapes() {
    ///         println!("{} at x={}", shape.name(), shape.x().unwrap_or_default());
    ///     }
    /// }
    /// # Ok::<(), slidekit::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, PresentationOptions::default())
    }

    /// Open a presentation with explicit options.
    pub fn open_with_options(path: impl AsRef<Path>, options: PresentationOptions) -> Result<Self> {
        Self::from_container(OoxmlContainer::open(path)?, options)
    }

    /// Open a presentation from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_options(data, PresentationOptions::default())
    }

    /// Open a presentation from bytes with explicit options.
    pub fn from_bytes_with_options(data: Vec<u8>, options: PresentationOptions) -> Result<Self> {
        Self::from_container(OoxmlContainer::from_bytes(data)?, options)
    }

    /// Open a presentation from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_container(OoxmlContainer::from_reader(reader)?, PresentationOptions::default())
    }

    fn from_container(container: OoxmlContainer, options: PresentationOptions) -> Result<Self> {
        let package_rels = container.read_relationships("")?;
        let main_path = package_rels
            .first_of_type(rel_types::OFFICE_DOCUMENT)
            .map(|r| OoxmlContainer::resolve_path("", &r.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        let main = XmlPart::load(&container, &main_path)?;
        let content_types = XmlPart::load(&container, "[Content_Types].xml")?;

        let mut masters = Vec::new();
        let mut layouts = Vec::new();
        for rel_id in id_list_rel_ids(&main.root, "sldMasterIdLst") {
            let Some(path) = main.target_path(&rel_id) else {
                warn!("slide master relationship {} not found", rel_id);
                continue;
            };
            let xml = XmlPart::load(&container, &path)?;

            let theme = match xml.target_path_by_type(rel_types::THEME) {
                Some(theme_path) => Theme::parse(&container.read_element(&theme_path)?),
                None => {
                    warn!("slide master {} has no theme", path);
                    Theme::default()
                }
            };
            let color_map = xml
                .root
                .child("clrMap")
                .map(ColorMap::from_element)
                .unwrap_or_default();

            let master = masters.len();
            for layout_rel in id_list_rel_ids(&xml.root, "sldLayoutIdLst") {
                match xml.target_path(&layout_rel) {
                    Some(layout_path) => layouts.push(LayoutEntry {
                        xml: XmlPart::load(&container, &layout_path)?,
                        master,
                    }),
                    None => warn!("layout relationship {} of {} not found", layout_rel, path),
                }
            }

            masters.push(MasterEntry {
                xml,
                theme,
                color_map,
            });
        }

        let mut slides = Vec::new();
        if let Some(list) = main.root.child("sldIdLst") {
            for entry in list.elements() {
                let Some(rel_id) = rel_id_attr(entry) else {
                    continue;
                };
                let Some(path) = main.target_path(rel_id) else {
                    warn!("slide relationship {} not found", rel_id);
                    continue;
                };
                let xml = XmlPart::load(&container, &path)?;
                let layout = xml
                    .target_path_by_type(rel_types::SLIDE_LAYOUT)
                    .and_then(|lp| layouts.iter().position(|l: &LayoutEntry| l.xml.path == lp));
                if layout.is_none() {
                    warn!("slide {} has no known layout", path);
                }
                slides.push(SlideEntry {
                    xml,
                    layout,
                    rel_id: rel_id.to_string(),
                    id: entry.attr_parse("id").unwrap_or_default(),
                });
            }
        }

        let level_fonts =
            styles::level_font_table(&main.root, masters.first().map(|m| &m.xml.root));

        debug!(
            "opened presentation: {} masters, {} layouts, {} slides",
            masters.len(),
            layouts.len(),
            slides.len()
        );

        Ok(Self {
            container,
            options,
            metrics: Box::new(ApproximateMetrics::default()),
            main,
            content_types,
            masters,
            layouts,
            slides,
            level_fonts,
            removed: Vec::new(),
            cache: RefCell::new(ResolveCache::default()),
        })
    }

    /// Options in effect.
    pub fn options(&self) -> &PresentationOptions {
        &self.options
    }

    /// Replace the options. Cached values are discarded.
    pub fn set_options(&mut self, options: PresentationOptions) {
        self.options = options;
        self.cache.get_mut().clear();
    }

    /// Replace the glyph metrics used by text autofit.
    pub fn set_glyph_metrics(&mut self, metrics: impl GlyphMetrics + 'static) {
        self.metrics = Box::new(metrics);
    }

    pub(crate) fn metrics(&self) -> &dyn GlyphMetrics {
        self.metrics.as_ref()
    }

    pub(crate) fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    // ---- part access ----

    pub(crate) fn part(&self, part: PartRef) -> Result<&XmlPart> {
        match part {
            PartRef::Slide(i) => self.slides.get(i).map(|s| &s.xml).ok_or(Error::SlideNotFound(i)),
            PartRef::Layout(i) => self
                .layouts
                .get(i)
                .map(|l| &l.xml)
                .ok_or(Error::LayoutNotFound(i)),
            PartRef::Master(i) => self
                .masters
                .get(i)
                .map(|m| &m.xml)
                .ok_or_else(|| Error::MissingComponent(format!("slide master {}", i))),
        }
    }

    /// Mutable access to a part. Marks it for saving and drops cached
    /// values that may depend on it.
    pub(crate) fn part_mut(&mut self, part: PartRef) -> Result<&mut XmlPart> {
        self.cache.get_mut().invalidate(part);
        let xml = match part {
            PartRef::Slide(i) => self
                .slides
                .get_mut(i)
                .map(|s| &mut s.xml)
                .ok_or(Error::SlideNotFound(i))?,
            PartRef::Layout(i) => self
                .layouts
                .get_mut(i)
                .map(|l| &mut l.xml)
                .ok_or(Error::LayoutNotFound(i))?,
            PartRef::Master(i) => self
                .masters
                .get_mut(i)
                .map(|m| &mut m.xml)
                .ok_or_else(|| Error::MissingComponent(format!("slide master {}", i)))?,
        };
        xml.dirty = true;
        Ok(xml)
    }

    /// The element a shape key addresses.
    pub(crate) fn element(&self, key: &ShapeKey) -> Result<&XmlElement> {
        let tree = self.part(key.part)?.shape_tree()?;
        key.path
            .iter()
            .try_fold(tree, |el, &i| el.element_at(i))
            .ok_or_else(|| Error::ShapeNotFound(key.to_string()))
    }

    pub(crate) fn element_mut(&mut self, key: &ShapeKey) -> Result<&mut XmlElement> {
        let mut el = self.part_mut(key.part)?.shape_tree_mut()?;
        for &i in &key.path {
            el = el
                .element_at_mut(i)
                .ok_or_else(|| Error::ShapeNotFound(key.to_string()))?;
        }
        Ok(el)
    }

    /// The part a part inherits placeholders from: slide → layout → master.
    pub(crate) fn inherited_part(&self, part: PartRef) -> Option<PartRef> {
        match part {
            PartRef::Slide(i) => self.slides.get(i)?.layout.map(PartRef::Layout),
            PartRef::Layout(i) => Some(PartRef::Master(self.layouts.get(i)?.master)),
            PartRef::Master(_) => None,
        }
    }

    pub(crate) fn master_index(&self, part: PartRef) -> Option<usize> {
        match part {
            PartRef::Slide(i) => {
                let layout = self.slides.get(i)?.layout?;
                Some(self.layouts.get(layout)?.master)
            }
            PartRef::Layout(i) => Some(self.layouts.get(i)?.master),
            PartRef::Master(i) => (i < self.masters.len()).then_some(i),
        }
    }

    pub(crate) fn master_entry(&self, part: PartRef) -> Option<&MasterEntry> {
        self.masters.get(self.master_index(part)?)
    }

    /// Theme governing a part; falls back to the first master's theme.
    pub(crate) fn theme_for(&self, part: PartRef) -> Option<&Theme> {
        self.master_entry(part)
            .or_else(|| self.masters.first())
            .map(|m| &m.theme)
    }

    pub(crate) fn color_map_for(&self, part: PartRef) -> ColorMap {
        self.master_entry(part)
            .map(|m| m.color_map.clone())
            .unwrap_or_default()
    }

    /// Presentation-wide run defaults for a 1-based outline level.
    pub(crate) fn level_font(&self, level: usize) -> Option<&FontProps> {
        self.level_fonts.get(&level)
    }

    // ---- collections ----

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> Vec<Slide<'_>> {
        (0..self.slides.len()).map(|i| Slide::new(self, i)).collect()
    }

    /// Slide by 0-based position.
    pub fn slide(&self, index: usize) -> Result<Slide<'_>> {
        if index >= self.slides.len() {
            return Err(Error::SlideNotFound(index));
        }
        Ok(Slide::new(self, index))
    }

    /// All slide layouts, grouped by master in master order.
    pub fn layouts(&self) -> Vec<SlideLayout<'_>> {
        (0..self.layouts.len())
            .map(|i| SlideLayout::new(self, i))
            .collect()
    }

    /// Slide layout by position.
    pub fn layout(&self, index: usize) -> Result<SlideLayout<'_>> {
        if index >= self.layouts.len() {
            return Err(Error::LayoutNotFound(index));
        }
        Ok(SlideLayout::new(self, index))
    }

    /// Slide masters.
    pub fn masters(&self) -> Vec<SlideMaster<'_>> {
        (0..self.masters.len())
            .map(|i| SlideMaster::new(self, i))
            .collect()
    }

    /// Slide size in EMU (`p:sldSz`).
    pub fn slide_size_emu(&self) -> (i64, i64) {
        self.main
            .root
            .child("sldSz")
            .and_then(|s| Some((s.attr_parse("cx")?, s.attr_parse("cy")?)))
            .unwrap_or(DEFAULT_SLIDE_SIZE)
    }

    /// Slide width in pixels.
    pub fn slide_width(&self) -> i64 {
        emu_to_px(self.slide_size_emu().0, self.options.horizontal_dpi)
    }

    /// Slide height in pixels.
    pub fn slide_height(&self) -> i64 {
        emu_to_px(self.slide_size_emu().1, self.options.vertical_dpi)
    }

    /// Read view of a shape.
    pub fn shape(&self, key: &ShapeKey) -> Result<Shape<'_>> {
        Shape::new(self, key.clone())
    }

    /// Mutable view of a shape.
    pub fn shape_mut(&mut self, key: &ShapeKey) -> Result<ShapeMut<'_>> {
        ShapeMut::new(self, key.clone())
    }

    /// Key of the first shape named `name` on a slide, searching inside groups.
    pub fn find_shape(&self, slide: usize, name: &str) -> Result<ShapeKey> {
        self.slide(slide)?
            .shape_by_name(name)
            .map(|s| s.key().clone())
            .ok_or_else(|| Error::ShapeNotFound(format!("slide {}: {}", slide, name)))
    }

    // ---- sections ----

    /// Sections in document order with the slide positions they contain.
    pub fn sections(&self) -> Vec<Section> {
        sections::read_sections(&self.main.root, &self.slide_ids())
    }

    /// Remove a section by name; its slides stay in the presentation.
    pub fn remove_section(&mut self, name: &str) -> Result<()> {
        if !sections::remove_section(&mut self.main.root, name) {
            return Err(Error::MissingComponent(format!("section '{}'", name)));
        }
        self.main.dirty = true;
        Ok(())
    }

    fn slide_ids(&self) -> Vec<u32> {
        self.slides.iter().map(|s| s.id).collect()
    }

    // ---- slide collection edits ----

    /// Append a new slide based on a layout and return its position.
    ///
    /// The slide receives the layout's content placeholders without explicit
    /// geometry, so their position and size resolve through the layout.
    pub fn add_slide(&mut self, layout: usize) -> Result<usize> {
        let layout_entry = self.layouts.get(layout).ok_or(Error::LayoutNotFound(layout))?;
        let layout_path = layout_entry.xml.path.clone();
        let root = new_slide_root(&layout_entry.xml.root);

        let path = self.free_slide_path();
        let mut rels = Relationships::new();
        rels.add_new(
            rel_types::SLIDE_LAYOUT,
            &OoxmlContainer::relative_path(&path, &layout_path),
            false,
        );

        let target = OoxmlContainer::relative_path(&self.main.path, &path);
        let rel_id = self.main.rels.add_new(rel_types::SLIDE, &target, false);
        self.main.rels_dirty = true;

        let id = self
            .slides
            .iter()
            .map(|s| s.id + 1)
            .max()
            .unwrap_or(FIRST_SLIDE_ID)
            .max(FIRST_SLIDE_ID);
        slide_id_list(&mut self.main.root).append_element(
            XmlElement::new("p:sldId")
                .with_attr("id", id.to_string())
                .with_attr("r:id", rel_id.as_str()),
        );
        self.main.dirty = true;

        self.content_types.root.append_element(
            XmlElement::new("Override")
                .with_attr("PartName", format!("/{}", path))
                .with_attr("ContentType", SLIDE_CONTENT_TYPE),
        );
        self.content_types.dirty = true;
        self.removed.retain(|p| *p != path);

        debug!("added slide {} from layout {}", path, layout_path);
        self.slides.push(SlideEntry {
            xml: XmlPart::new(path, root, rels),
            layout: Some(layout),
            rel_id,
            id,
        });
        self.cache.get_mut().clear();
        Ok(self.slides.len() - 1)
    }

    /// Remove the slide at `index` together with its notes and section membership.
    pub fn remove_slide(&mut self, index: usize) -> Result<()> {
        if index >= self.slides.len() {
            return Err(Error::SlideNotFound(index));
        }
        let entry = self.slides.remove(index);

        if let Some(list) = self.main.root.child_mut("sldIdLst") {
            let found = list
                .elements()
                .position(|e| rel_id_attr(e) == Some(entry.rel_id.as_str()));
            if let Some(pos) = found {
                list.remove_element(pos);
            }
        }
        self.main.rels.remove(&entry.rel_id);
        sections::forget_slide(&mut self.main.root, entry.id);
        self.main.dirty = true;
        self.main.rels_dirty = true;

        let mut doomed = vec![entry.xml.path.clone()];
        if let Some(notes) = entry.xml.target_path_by_type(rel_types::NOTES_SLIDE) {
            doomed.push(notes);
        }
        for path in doomed {
            let part_name = format!("/{}", path);
            self.content_types
                .root
                .children
                .retain(|n| !matches!(n, crate::xml::XmlNode::Element(e) if e.attr("PartName") == Some(part_name.as_str())));
            self.removed.push(Relationships::path_for(&path));
            self.removed.push(path);
        }
        self.content_types.dirty = true;

        debug!("removed slide {}", entry.xml.path);
        self.cache.get_mut().clear();
        Ok(())
    }

    /// Move a slide from one position to another.
    pub fn move_slide(&mut self, from: usize, to: usize) -> Result<()> {
        let count = self.slides.len();
        if from >= count {
            return Err(Error::SlideNotFound(from));
        }
        if to >= count {
            return Err(Error::SlideNotFound(to));
        }
        if from == to {
            return Ok(());
        }

        let entry = self.slides.remove(from);
        self.slides.insert(to, entry);

        let slides = &self.slides;
        if let Some(list) = self.main.root.child_mut("sldIdLst") {
            let mut items = Vec::new();
            while let Some(item) = list.remove_element(0) {
                items.push(item);
            }
            list.children.clear();
            items.sort_by_key(|e| {
                rel_id_attr(e)
                    .and_then(|r| slides.iter().position(|s| s.rel_id == r))
                    .unwrap_or(usize::MAX)
            });
            for item in items {
                list.append_element(item);
            }
        }
        self.main.dirty = true;
        self.cache.get_mut().clear();
        Ok(())
    }

    fn free_slide_path(&self) -> String {
        let mut n = self.slides.len() + 1;
        loop {
            let path = format!("ppt/slides/slide{}.xml", n);
            let taken = self.slides.iter().any(|s| s.xml.path == path)
                || (self.container.exists(&path) && !self.removed.contains(&path));
            if !taken {
                return path;
            }
            n += 1;
        }
    }

    // ---- saving ----

    /// Serialize the presentation into a new package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write the presentation package to `writer`.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut changes = PackageChanges::default();
        for path in &self.removed {
            changes.remove(path.clone());
        }

        self.main.stage(&mut changes)?;
        self.content_types.stage(&mut changes)?;
        for master in &self.masters {
            master.xml.stage(&mut changes)?;
        }
        for layout in &self.layouts {
            layout.xml.stage(&mut changes)?;
        }
        for slide in &self.slides {
            slide.xml.stage(&mut changes)?;
        }

        debug!(
            "writing package: {} changed parts, {} removed",
            changes.parts.len(),
            changes.removed.len()
        );
        self.container.write_to(writer, &changes)
    }

    /// Save the presentation to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("main", &self.main.path)
            .field("masters", &self.masters.len())
            .field("layouts", &self.layouts.len())
            .field("slides", &self.slides.len())
            .field("options", &self.options)
            .finish()
    }
}

/// `p:sldIdLst`, created after the master/notes/handout id lists when missing.
fn slide_id_list(root: &mut XmlElement) -> &mut XmlElement {
    let after = ["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"]
        .iter()
        .filter_map(|name| root.position_of(name))
        .max()
        .map(|p| p + 1)
        .unwrap_or(0);
    root.ensure_child_at("p:sldIdLst", after)
}

/// Skeleton of a new slide carrying the layout's non-footer placeholders.
fn new_slide_root(layout_root: &XmlElement) -> XmlElement {
    let mut tree = XmlElement::new("p:spTree")
        .with_child(
            XmlElement::new("p:nvGrpSpPr")
                .with_child(
                    XmlElement::new("p:cNvPr")
                        .with_attr("id", "1")
                        .with_attr("name", ""),
                )
                .with_child(XmlElement::new("p:cNvGrpSpPr"))
                .with_child(XmlElement::new("p:nvPr")),
        )
        .with_child(XmlElement::new("p:grpSpPr"));

    if let Some(layout_tree) = layout_root.path(&["cSld", "spTree"]) {
        for sp in layout_tree.children_named("sp") {
            let Some(ph) = crate::model::Placeholder::of_shape(sp) else {
                continue;
            };
            if ph.placeholder_type.is_some_and(|t| t.is_footer_area()) {
                continue;
            }
            tree.append_element(placeholder_stub(sp, &ph));
        }
    }

    XmlElement::new("p:sld")
        .with_attr("xmlns:a", NS_A)
        .with_attr("xmlns:r", NS_R)
        .with_attr("xmlns:p", NS_P)
        .with_child(XmlElement::new("p:cSld").with_child(tree))
        .with_child(
            XmlElement::new("p:clrMapOvr").with_child(XmlElement::new("a:masterClrMapping")),
        )
}

fn placeholder_stub(layout_sp: &XmlElement, ph: &crate::model::Placeholder) -> XmlElement {
    let c_nv_pr = layout_sp.path(&["nvSpPr", "cNvPr"]);
    let id = c_nv_pr.and_then(|c| c.attr("id")).unwrap_or("2");
    let name = c_nv_pr.and_then(|c| c.attr("name")).unwrap_or("Placeholder");

    let mut sp = XmlElement::new("p:sp")
        .with_child(
            XmlElement::new("p:nvSpPr")
                .with_child(
                    XmlElement::new("p:cNvPr")
                        .with_attr("id", id)
                        .with_attr("name", name),
                )
                .with_child(
                    XmlElement::new("p:cNvSpPr").with_child(
                        XmlElement::new("a:spLocks").with_attr("noGrp", "1"),
                    ),
                )
                .with_child(XmlElement::new("p:nvPr").with_child(ph.to_element())),
        )
        .with_child(XmlElement::new("p:spPr"));

    if layout_sp.child("txBody").is_some() {
        sp.append_element(
            XmlElement::new("p:txBody")
                .with_child(XmlElement::new("a:bodyPr"))
                .with_child(XmlElement::new("a:lstStyle"))
                .with_child(XmlElement::new("a:p")),
        );
    }
    sp
}
