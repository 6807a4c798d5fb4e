//! Shape fill and outline.

use super::presentation::Presentation;
use crate::error::{Error, Result};
use crate::model::{PartRef, Resource, ShapeKey, ShapeKind};
use crate::units::{emu_to_points, points_to_emu};
use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Fill choice elements of DrawingML properties.
pub(crate) const FILL_ELEMENTS: [&str; 6] = [
    "noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill",
];

/// Child order of `p:spPr` / `p:grpSpPr`.
pub(crate) const SHAPE_PROPERTIES_ORDER: &[&str] = &[
    "xfrm",
    "custGeom",
    "prstGeom",
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
    "ln",
    "effectLst",
    "effectDag",
    "scene3d",
    "sp3d",
    "extLst",
];

/// Child order of `a:ln`.
const LINE_ORDER: &[&str] = &[
    "noFill", "solidFill", "gradFill", "pattFill", "prstDash", "custDash", "round", "bevel",
    "miter", "headEnd", "tailEnd", "extLst",
];

/// Validate a 6-digit hex colour (leading `#` allowed) and return it upper-cased.
pub(crate) fn parse_hex_color(value: &str) -> Result<String> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::MalformedReference(format!(
            "'{}' is not a 6-digit hex colour",
            value
        )));
    }
    Ok(hex.to_ascii_uppercase())
}

/// Colour reference inside a fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum ColorSpec {
    /// Literal RGB hex (`a:srgbClr`, or `a:sysClr/@lastClr`)
    Rgb(String),
    /// Theme slot or mapped name (`a:schemeClr/@val`)
    Scheme(String),
}

impl ColorSpec {
    /// Read the colour of an `a:solidFill`.
    pub fn from_fill(solid_fill: &XmlElement) -> Option<Self> {
        let color = solid_fill.elements().next()?;
        match color.local_name() {
            "srgbClr" => color.attr("val").map(|v| Self::Rgb(v.to_ascii_uppercase())),
            "sysClr" => color.attr("lastClr").map(|v| Self::Rgb(v.to_ascii_uppercase())),
            "schemeClr" => color.attr("val").map(|v| Self::Scheme(v.to_string())),
            _ => None,
        }
    }

    /// Hex value, following scheme colours through the part's colour map and theme.
    pub(crate) fn resolve(&self, pres: &Presentation, part: PartRef) -> Option<String> {
        match self {
            Self::Rgb(hex) => Some(hex.clone()),
            Self::Scheme(name) => {
                let theme = pres.theme_for(part)?;
                pres.color_map_for(part)
                    .resolve(theme, name)
                    .map(|h| h.to_ascii_uppercase())
            }
        }
    }
}

/// Kind of fill on a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillType {
    NoFill,
    Solid,
    Gradient,
    Picture,
    Pattern,
    /// `p:sp/@useBgFill`
    SlideBackground,
}

/// The properties element carrying fill and outline for a shape.
pub(crate) fn properties_of(el: &XmlElement) -> Option<&XmlElement> {
    match ShapeKind::from_element(el)? {
        ShapeKind::Group => el.child("grpSpPr"),
        _ => el.child("spPr"),
    }
}

pub(crate) fn properties_of_mut(el: &mut XmlElement) -> Result<&mut XmlElement> {
    let name = match ShapeKind::from_element(el) {
        Some(ShapeKind::Group) => "p:grpSpPr",
        Some(ShapeKind::AutoShape | ShapeKind::Picture | ShapeKind::Media | ShapeKind::Connector) => {
            "p:spPr"
        }
        _ => {
            return Err(Error::InvalidMutation(format!(
                "{} has no shape properties",
                el.name
            )))
        }
    };
    Ok(el.ensure_child_at(name, properties_index(el)))
}

/// Where shape properties go when absent: after the non-visual properties,
/// and after `p:blipFill` in pictures.
pub(crate) fn properties_index(el: &XmlElement) -> usize {
    el.position_of("blipFill").map_or(1, |p| p + 1)
}

/// Fill of a shape.
pub struct ShapeFill<'a> {
    pres: &'a Presentation,
    key: ShapeKey,
}

impl<'a> ShapeFill<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: ShapeKey) -> Self {
        Self { pres, key }
    }

    fn properties(&self) -> Option<&'a XmlElement> {
        properties_of(self.pres.element(&self.key).ok()?)
    }

    pub fn fill_type(&self) -> FillType {
        let props = self.properties();
        let has = |name: &str| props.is_some_and(|p| p.child(name).is_some());
        if has("solidFill") {
            FillType::Solid
        } else if has("gradFill") {
            FillType::Gradient
        } else if has("blipFill") {
            FillType::Picture
        } else if has("pattFill") {
            FillType::Pattern
        } else if self
            .pres
            .element(&self.key)
            .ok()
            .and_then(|el| el.attr_bool("useBgFill"))
            == Some(true)
        {
            FillType::SlideBackground
        } else {
            FillType::NoFill
        }
    }

    /// Hex colour of a solid fill.
    pub fn color(&self) -> Option<String> {
        let solid = self.properties()?.child("solidFill")?;
        ColorSpec::from_fill(solid)?.resolve(self.pres, self.key.part)
    }

    /// Opacity of a solid fill in percent (100 when unset).
    pub fn alpha(&self) -> f64 {
        self.properties()
            .and_then(|p| p.child("solidFill"))
            .and_then(|f| f.elements().next())
            .and_then(|c| c.child("alpha"))
            .and_then(|a| a.attr_parse::<f64>("val"))
            .map(|v| v / 1000.0)
            .unwrap_or(100.0)
    }

    /// Image of a picture fill.
    pub fn picture(&self) -> Result<Option<Resource>> {
        let Some(blip) = self.properties().and_then(|p| p.path(&["blipFill", "blip"])) else {
            return Ok(None);
        };
        load_embedded(self.pres, self.key.part, blip).map(Some)
    }
}

/// Read the part a `r:embed` / `r:link` attribute points at.
pub(crate) fn load_embedded(pres: &Presentation, part: PartRef, el: &XmlElement) -> Result<Resource> {
    let rel_id = el
        .attr("r:embed")
        .or_else(|| el.attr("r:link"))
        .ok_or_else(|| Error::MissingComponent(format!("{}: relationship id", el.name)))?;
    let path = pres
        .part(part)?
        .target_path(rel_id)
        .ok_or_else(|| Error::MissingComponent(format!("relationship {}", rel_id)))?;
    let data = pres.container().read_binary(&path)?;
    Ok(Resource::from_part(path, data))
}

/// Replace any fill with a solid colour.
pub(crate) fn write_solid_fill(props: &mut XmlElement, hex: &str) {
    for name in FILL_ELEMENTS {
        props.remove_children(name);
    }
    props
        .ensure_child_ordered("a:solidFill", SHAPE_PROPERTIES_ORDER)
        .append_element(XmlElement::new("a:srgbClr").with_attr("val", hex));
}

/// Replace any fill with `a:noFill`.
pub(crate) fn write_no_fill(props: &mut XmlElement) {
    for name in FILL_ELEMENTS {
        props.remove_children(name);
    }
    props.ensure_child_ordered("a:noFill", SHAPE_PROPERTIES_ORDER);
}

/// Outline of a shape (`a:ln`).
pub struct ShapeOutline<'a> {
    pres: &'a Presentation,
    key: ShapeKey,
}

impl<'a> ShapeOutline<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: ShapeKey) -> Self {
        Self { pres, key }
    }

    fn line(&self) -> Option<&'a XmlElement> {
        properties_of(self.pres.element(&self.key).ok()?)?.child("ln")
    }

    /// Line weight in points, 0 when unset.
    pub fn weight(&self) -> f64 {
        self.line()
            .and_then(|ln| ln.attr_parse::<i64>("w"))
            .map(emu_to_points)
            .unwrap_or(0.0)
    }

    /// Hex colour of a solid line.
    pub fn color(&self) -> Option<String> {
        let solid = self.line()?.child("solidFill")?;
        ColorSpec::from_fill(solid)?.resolve(self.pres, self.key.part)
    }

    /// Whether the line is explicitly switched off.
    pub fn is_none(&self) -> bool {
        self.line().is_some_and(|ln| ln.child("noFill").is_some())
    }
}

/// Set the line weight in points. A line switched off with `a:noFill` is
/// switched back on.
pub(crate) fn write_outline_weight(props: &mut XmlElement, points: f64) {
    let ln = props.ensure_child_ordered("a:ln", SHAPE_PROPERTIES_ORDER);
    ln.remove_children("noFill");
    ln.set_attr("w", points_to_emu(points).to_string());
}

pub(crate) fn write_outline_color(props: &mut XmlElement, hex: &str) {
    let ln = props.ensure_child_ordered("a:ln", SHAPE_PROPERTIES_ORDER);
    for name in FILL_ELEMENTS {
        ln.remove_children(name);
    }
    ln.ensure_child_ordered("a:solidFill", LINE_ORDER)
        .append_element(XmlElement::new("a:srgbClr").with_attr("val", hex));
}

pub(crate) fn write_no_outline(props: &mut XmlElement) {
    let ln = props.ensure_child_ordered("a:ln", SHAPE_PROPERTIES_ORDER);
    for name in FILL_ELEMENTS {
        ln.remove_children(name);
    }
    ln.ensure_child_ordered("a:noFill", LINE_ORDER);
}
