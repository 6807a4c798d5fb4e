//! Geometry values in EMU.

use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Shape outline geometry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryType {
    /// `rect`, also the fallback when nothing defines a geometry
    #[default]
    Rectangle,
    /// `roundRect`
    RoundRectangle,
    /// `ellipse`
    Ellipse,
    /// `triangle`
    Triangle,
    /// `rtTriangle`
    RightTriangle,
    /// `diamond`
    Diamond,
    /// `pentagon`
    Pentagon,
    /// `hexagon`
    Hexagon,
    /// `line`
    Line,
    /// `custGeom`
    Custom,
    /// Any other preset, by its OOXML name
    Preset(String),
}

impl GeometryType {
    /// Map a `a:prstGeom/@prst` value.
    pub fn from_preset(prst: &str) -> Self {
        match prst {
            "rect" => Self::Rectangle,
            "roundRect" => Self::RoundRectangle,
            "ellipse" => Self::Ellipse,
            "triangle" => Self::Triangle,
            "rtTriangle" => Self::RightTriangle,
            "diamond" => Self::Diamond,
            "pentagon" => Self::Pentagon,
            "hexagon" => Self::Hexagon,
            "line" => Self::Line,
            other => Self::Preset(other.to_string()),
        }
    }

    /// Read the geometry declared in a shape properties element (`p:spPr`).
    pub fn from_shape_properties(sp_pr: &XmlElement) -> Option<Self> {
        if let Some(prst) = sp_pr.child("prstGeom").and_then(|g| g.attr("prst")) {
            return Some(Self::from_preset(prst));
        }
        sp_pr.child("custGeom").map(|_| Self::Custom)
    }
}

/// Offset and extent of a shape as found or inherited.
///
/// `offset` is `None` when neither the shape nor any placeholder ancestor
/// defines one and the shape is not a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedBox {
    /// (x, y) in EMU
    pub offset: Option<(i64, i64)>,
    /// (cx, cy) in EMU
    pub extent: (i64, i64),
}

/// Explicit transform components of one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    /// `a:off`
    pub offset: Option<(i64, i64)>,
    /// `a:ext`
    pub extent: Option<(i64, i64)>,
}

impl Transform {
    /// Read `a:off` and `a:ext` from an `a:xfrm`/`p:xfrm` element.
    pub fn from_xfrm(xfrm: &XmlElement) -> Self {
        let offset = xfrm
            .child("off")
            .and_then(|o| Some((o.attr_parse("x")?, o.attr_parse("y")?)));
        let extent = xfrm
            .child("ext")
            .and_then(|e| Some((e.attr_parse("cx")?, e.attr_parse("cy")?)));
        Self { offset, extent }
    }
}

/// The transform of a group: its outer box in parent space and the child
/// coordinate space its children are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupTransform {
    /// Outer offset (x, y)
    pub off: (i64, i64),
    /// Outer extent (cx, cy)
    pub ext: (i64, i64),
    /// Child offset
    pub ch_off: (i64, i64),
    /// Child extent
    pub ch_ext: (i64, i64),
}

impl GroupTransform {
    /// Read from a group's `a:xfrm`. Missing child space defaults to the outer box.
    pub fn from_xfrm(xfrm: &XmlElement) -> Self {
        let pair = |name: &str, a: &str, b: &str| {
            xfrm.child(name)
                .and_then(|e| Some((e.attr_parse::<i64>(a)?, e.attr_parse::<i64>(b)?)))
        };
        let off = pair("off", "x", "y").unwrap_or_default();
        let ext = pair("ext", "cx", "cy").unwrap_or_default();
        Self {
            off,
            ext,
            ch_off: pair("chOff", "x", "y").unwrap_or(off),
            ch_ext: pair("chExt", "cx", "cy").unwrap_or(ext),
        }
    }

    /// Write all four components back into a group's `a:xfrm`.
    pub fn write_to(&self, xfrm: &mut XmlElement) {
        let rows = [
            ("a:off", "x", "y", self.off),
            ("a:ext", "cx", "cy", self.ext),
            ("a:chOff", "x", "y", self.ch_off),
            ("a:chExt", "cx", "cy", self.ch_ext),
        ];
        for (i, (name, a, b, (va, vb))) in rows.into_iter().enumerate() {
            let el = xfrm.ensure_child_at(name, i);
            el.set_attr(a, va.to_string());
            el.set_attr(b, vb.to_string());
        }
    }

    /// Map a horizontal child-space coordinate into parent space.
    pub fn child_to_parent_x(&self, x: i64) -> i64 {
        x - self.ch_off.0 + self.off.0
    }

    /// Map a vertical child-space coordinate into parent space.
    pub fn child_to_parent_y(&self, y: i64) -> i64 {
        y - self.ch_off.1 + self.off.1
    }

    /// Map a horizontal parent-space coordinate into child space.
    pub fn parent_to_child_x(&self, x: i64) -> i64 {
        x - self.off.0 + self.ch_off.0
    }

    /// Map a vertical parent-space coordinate into child space.
    pub fn parent_to_child_y(&self, y: i64) -> i64 {
        y - self.off.1 + self.ch_off.1
    }
}
