//! Text frame enumerations.

use serde::{Deserialize, Serialize};

/// How a text frame reacts to text that does not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutofitType {
    /// `a:noAutofit`, or no autofit element at all
    #[default]
    None,
    /// `a:normAutofit`: shrink the font until the text fits
    Shrink,
    /// `a:spAutoFit`: grow the shape to fit the text
    Resize,
}

impl AutofitType {
    /// Element name written under `a:bodyPr` for this mode.
    pub(crate) fn element_name(&self) -> &'static str {
        match self {
            Self::None => "a:noAutofit",
            Self::Shrink => "a:normAutofit",
            Self::Resize => "a:spAutoFit",
        }
    }

    /// Mode for an `a:bodyPr` child, if it is an autofit element.
    pub(crate) fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "noAutofit" => Some(Self::None),
            "normAutofit" => Some(Self::Shrink),
            "spAutoFit" => Some(Self::Resize),
            _ => None,
        }
    }
}

/// Horizontal paragraph alignment (`a:pPr/@algn`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    /// `l`
    #[default]
    Left,
    /// `ctr`
    Center,
    /// `r`
    Right,
    /// `just`
    Justify,
}

impl TextAlignment {
    pub(crate) fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" | "dist" => Some(Self::Justify),
            _ => None,
        }
    }

    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }
}

/// Vertical anchoring of text inside its frame (`a:bodyPr/@anchor`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    /// `t`
    #[default]
    Top,
    /// `ctr`
    Middle,
    /// `b`
    Bottom,
}

impl VerticalAlignment {
    pub(crate) fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "t" => Some(Self::Top),
            "ctr" => Some(Self::Middle),
            "b" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Middle => "ctr",
            Self::Bottom => "b",
        }
    }
}

/// Kind of a slide field portion (`a:fld/@type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// `slidenum`
    SlideNumber,
    /// `datetime`, `datetime1` ... `datetime13`
    DateTime,
    /// Any other field type, by its OOXML name
    Other(String),
}

impl FieldType {
    pub(crate) fn from_ooxml(value: &str) -> Self {
        if value == "slidenum" {
            Self::SlideNumber
        } else if value.starts_with("datetime") {
            Self::DateTime
        } else {
            Self::Other(value.to_string())
        }
    }
}
