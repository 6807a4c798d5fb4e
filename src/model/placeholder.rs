//! Placeholder keys.

use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// Placeholder type as written in `p:ph/@type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderType {
    /// `title`
    Title,
    /// `ctrTitle`
    CenteredTitle,
    /// `subTitle`
    SubTitle,
    /// `body`
    Body,
    /// `obj`
    Object,
    /// `dt`
    DateAndTime,
    /// `sldNum`
    SlideNumber,
    /// `ftr`
    Footer,
    /// `hdr`
    Header,
    /// `chart`
    Chart,
    /// `tbl`
    Table,
    /// `clipArt`
    ClipArt,
    /// `dgm`
    Diagram,
    /// `media`
    Media,
    /// `sldImg`
    SlideImage,
    /// `pic`
    Picture,
}

impl PlaceholderType {
    /// Parse the OOXML attribute value.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        Some(match value {
            "title" => Self::Title,
            "ctrTitle" => Self::CenteredTitle,
            "subTitle" => Self::SubTitle,
            "body" => Self::Body,
            "obj" => Self::Object,
            "dt" => Self::DateAndTime,
            "sldNum" => Self::SlideNumber,
            "ftr" => Self::Footer,
            "hdr" => Self::Header,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "sldImg" => Self::SlideImage,
            "pic" => Self::Picture,
            _ => return None,
        })
    }

    /// The OOXML attribute value.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CenteredTitle => "ctrTitle",
            Self::SubTitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::DateAndTime => "dt",
            Self::SlideNumber => "sldNum",
            Self::Footer => "ftr",
            Self::Header => "hdr",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::SlideImage => "sldImg",
            Self::Picture => "pic",
        }
    }

    /// Title-like placeholders take their text style from the master title style.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenteredTitle)
    }

    /// Footer-area placeholders that new slides do not copy from their layout.
    pub fn is_footer_area(&self) -> bool {
        matches!(self, Self::DateAndTime | Self::SlideNumber | Self::Footer | Self::Header)
    }
}

/// Lookup key linking a shape to its layout or master counterpart.
///
/// Both parts are optional: a missing type matches any type, a missing index
/// only prevents index-based matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Placeholder {
    /// Placeholder type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_type: Option<PlaceholderType>,
    /// Placeholder index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Placeholder {
    /// Create a placeholder key.
    pub fn new(placeholder_type: Option<PlaceholderType>, index: Option<u32>) -> Self {
        Self {
            placeholder_type,
            index,
        }
    }

    /// Read the key from a `p:ph` element.
    pub fn from_element(ph: &XmlElement) -> Self {
        Self {
            placeholder_type: ph.attr("type").and_then(PlaceholderType::from_ooxml),
            index: ph.attr_parse("idx"),
        }
    }

    /// Read the key of a shape element (`p:sp`, `p:pic`, `p:graphicFrame`, ...).
    pub fn of_shape(shape: &XmlElement) -> Option<Self> {
        let nv = shape.elements().find(|e| e.local_name().starts_with("nv"))?;
        let ph = nv.path(&["nvPr", "ph"])?;
        Some(Self::from_element(ph))
    }

    /// Build the `p:ph` element for this key.
    pub fn to_element(&self) -> XmlElement {
        let mut ph = XmlElement::new("p:ph");
        if let Some(t) = self.placeholder_type {
            ph.set_attr("type", t.as_ooxml());
        }
        if let Some(idx) = self.index {
            ph.set_attr("idx", idx.to_string());
        }
        ph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_type_round_trip() {
        for t in [
            PlaceholderType::Title,
            PlaceholderType::CenteredTitle,
            PlaceholderType::Body,
            PlaceholderType::SlideNumber,
            PlaceholderType::Picture,
        ] {
            assert_eq!(PlaceholderType::from_ooxml(t.as_ooxml()), Some(t));
        }
        assert_eq!(PlaceholderType::from_ooxml("bogus"), None);
    }

    #[test]
    fn test_of_shape() {
        let sp = XmlElement::parse(
            r#"<p:sp xmlns:p="urn:p"><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr/>
               <p:nvPr><p:ph type="body" idx="3"/></p:nvPr></p:nvSpPr></p:sp>"#,
        )
        .unwrap();
        let ph = Placeholder::of_shape(&sp).unwrap();
        assert_eq!(ph.placeholder_type, Some(PlaceholderType::Body));
        assert_eq!(ph.index, Some(3));

        let plain = XmlElement::parse(r#"<p:sp xmlns:p="urn:p"><p:nvSpPr><p:nvPr/></p:nvSpPr></p:sp>"#)
            .unwrap();
        assert!(Placeholder::of_shape(&plain).is_none());
    }

    #[test]
    fn test_wildcard_type() {
        let ph = Placeholder::from_element(&XmlElement::new("p:ph").with_attr("idx", "1"));
        assert_eq!(ph.placeholder_type, None);
        assert_eq!(ph.to_element().attr("type"), None);
        assert_eq!(ph.to_element().attr("idx"), Some("1"));
    }
}
