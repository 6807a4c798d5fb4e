//! Shape identity and classification.

use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const OLE_URI: &str = "http://schemas.openxmlformats.org/presentationml/2006/ole";
const DIAGRAM_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

/// A part that owns a shape tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "part", content = "index")]
pub enum PartRef {
    /// Slide by position in the presentation
    Slide(usize),
    /// Slide layout by position in the layout list
    Layout(usize),
    /// Slide master by position in the master list
    Master(usize),
}

/// Stable address of a shape: its part plus element indices from the shape tree root.
///
/// A key with a single index is a top-level shape; longer paths descend
/// through groups, so the parent group is always the key minus its last index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeKey {
    /// Owning part
    pub part: PartRef,
    /// Element child indices below `p:spTree`
    pub path: Vec<usize>,
}

impl ShapeKey {
    /// Key of a top-level shape.
    pub fn top_level(part: PartRef, index: usize) -> Self {
        Self {
            part,
            path: vec![index],
        }
    }

    /// Key of the enclosing group, if the shape is grouped.
    pub fn parent(&self) -> Option<ShapeKey> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Self {
            part: self.part,
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Key of the `index`-th element child of this group.
    pub fn child(&self, index: usize) -> ShapeKey {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            part: self.part,
            path,
        }
    }

    /// Whether the shape sits inside a group.
    pub fn is_grouped(&self) -> bool {
        self.path.len() > 1
    }
}

impl std::fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path: Vec<String> = self.path.iter().map(|i| i.to_string()).collect();
        write!(f, "{:?}/{}", self.part, path.join("/"))
    }
}

/// Shape variant, decided from the element name and graphic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    /// `p:sp`
    AutoShape,
    /// `p:pic` without a media link
    Picture,
    /// `p:pic` carrying an audio or video link
    Media,
    /// `p:graphicFrame` holding a chart
    Chart,
    /// `p:graphicFrame` holding a table
    Table,
    /// `p:graphicFrame` holding an OLE object
    OleObject,
    /// `p:graphicFrame` holding a SmartArt diagram
    Diagram,
    /// `p:cxnSp`
    Connector,
    /// `p:grpSp`
    Group,
}

impl ShapeKind {
    /// Classify a shape tree element. Non-shape elements (`p:nvGrpSpPr`,
    /// `p:extLst`, ...) and unknown graphic frames yield `None`.
    pub fn from_element(el: &XmlElement) -> Option<Self> {
        match el.local_name() {
            "sp" => Some(Self::AutoShape),
            "cxnSp" => Some(Self::Connector),
            "grpSp" => Some(Self::Group),
            "pic" => {
                let nv_pr = el.path(&["nvPicPr", "nvPr"]);
                let is_media = nv_pr.is_some_and(|nv| {
                    nv.child("videoFile").is_some() || nv.child("audioFile").is_some()
                });
                Some(if is_media { Self::Media } else { Self::Picture })
            }
            "graphicFrame" => {
                let uri = el.path(&["graphic", "graphicData"])?.attr("uri")?;
                match uri {
                    TABLE_URI => Some(Self::Table),
                    CHART_URI => Some(Self::Chart),
                    OLE_URI => Some(Self::OleObject),
                    DIAGRAM_URI => Some(Self::Diagram),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Name of the element that carries this kind's transform.
    pub(crate) fn properties_element(&self) -> &'static str {
        match self {
            Self::Group => "grpSpPr",
            Self::Chart | Self::Table | Self::OleObject | Self::Diagram => "xfrm",
            _ => "spPr",
        }
    }

    /// Whether shapes of this kind carry a text body.
    pub fn has_text_frame(&self) -> bool {
        matches!(self, Self::AutoShape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(uri: &str) -> XmlElement {
        XmlElement::new("p:graphicFrame").with_child(
            XmlElement::new("a:graphic")
                .with_child(XmlElement::new("a:graphicData").with_attr("uri", uri)),
        )
    }

    #[test]
    fn test_kind_factory() {
        assert_eq!(ShapeKind::from_element(&XmlElement::new("p:sp")), Some(ShapeKind::AutoShape));
        assert_eq!(ShapeKind::from_element(&XmlElement::new("p:grpSp")), Some(ShapeKind::Group));
        assert_eq!(ShapeKind::from_element(&XmlElement::new("p:nvGrpSpPr")), None);
        assert_eq!(ShapeKind::from_element(&frame(TABLE_URI)), Some(ShapeKind::Table));
        assert_eq!(ShapeKind::from_element(&frame(CHART_URI)), Some(ShapeKind::Chart));
        assert_eq!(ShapeKind::from_element(&frame(OLE_URI)), Some(ShapeKind::OleObject));
        assert_eq!(ShapeKind::from_element(&frame("urn:unknown")), None);
    }

    #[test]
    fn test_media_picture() {
        let pic = XmlElement::new("p:pic").with_child(
            XmlElement::new("p:nvPicPr")
                .with_child(XmlElement::new("p:nvPr").with_child(XmlElement::new("a:videoFile"))),
        );
        assert_eq!(ShapeKind::from_element(&pic), Some(ShapeKind::Media));
        assert_eq!(ShapeKind::from_element(&XmlElement::new("p:pic")), Some(ShapeKind::Picture));
    }

    #[test]
    fn test_key_parent() {
        let key = ShapeKey {
            part: PartRef::Slide(0),
            path: vec![3, 2, 4],
        };
        assert!(key.is_grouped());
        let parent = key.parent().unwrap();
        assert_eq!(parent.path, vec![3, 2]);
        assert_eq!(parent.child(4), key);
        assert!(ShapeKey::top_level(PartRef::Slide(0), 2).parent().is_none());
    }
}
