//! Theme font scheme, colour scheme and the master colour map.

use crate::xml::XmlElement;
use std::collections::HashMap;

const MAJOR_LATIN: &str = "+mj-lt";
const MINOR_LATIN: &str = "+mn-lt";
const FALLBACK_TYPEFACE: &str = "Calibri";

const SCHEME_SLOTS: [&str; 12] = [
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

/// Theme of a slide master.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name (`a:theme/@name`)
    pub name: Option<String>,
    /// Heading typeface (`a:majorFont/a:latin`)
    pub major_latin: String,
    /// Body typeface (`a:minorFont/a:latin`)
    pub minor_latin: String,
    colors: HashMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: None,
            major_latin: FALLBACK_TYPEFACE.to_string(),
            minor_latin: FALLBACK_TYPEFACE.to_string(),
            colors: HashMap::new(),
        }
    }
}

impl Theme {
    /// Read a theme part.
    pub fn parse(root: &XmlElement) -> Self {
        let mut theme = Self {
            name: root.attr("name").map(str::to_string),
            ..Self::default()
        };

        let Some(elements) = root.child("themeElements") else {
            return theme;
        };

        if let Some(fonts) = elements.child("fontScheme") {
            let latin = |slot: &str| {
                fonts
                    .path(&[slot, "latin"])
                    .and_then(|l| l.attr("typeface"))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            };
            if let Some(major) = latin("majorFont") {
                theme.major_latin = major;
            }
            if let Some(minor) = latin("minorFont") {
                theme.minor_latin = minor;
            }
        }

        if let Some(scheme) = elements.child("clrScheme") {
            for slot in SCHEME_SLOTS {
                let value = scheme.child(slot).and_then(|c| {
                    c.child("srgbClr")
                        .and_then(|s| s.attr("val"))
                        .or_else(|| c.child("sysClr").and_then(|s| s.attr("lastClr")))
                });
                if let Some(hex) = value {
                    theme.colors.insert(slot.to_string(), hex.to_uppercase());
                }
            }
        }

        theme
    }

    /// Hex value of a scheme slot (`dk1`, `accent2`, ...).
    pub fn color(&self, slot: &str) -> Option<&str> {
        self.colors.get(slot).map(String::as_str)
    }

    /// Replace `+mj-lt`/`+mn-lt` theme references with concrete typefaces.
    pub fn resolve_typeface(&self, typeface: &str) -> String {
        match typeface {
            MAJOR_LATIN => self.major_latin.clone(),
            MINOR_LATIN => self.minor_latin.clone(),
            other => other.to_string(),
        }
    }
}

/// Mapping from logical colour names (`tx1`, `bg1`, ...) to scheme slots (`p:clrMap`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    map: HashMap<String, String>,
}

impl Default for ColorMap {
    fn default() -> Self {
        let map = [("bg1", "lt1"), ("tx1", "dk1"), ("bg2", "lt2"), ("tx2", "dk2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { map }
    }
}

impl ColorMap {
    /// Read a master's `p:clrMap`.
    pub fn from_element(clr_map: &XmlElement) -> Self {
        let mut result = Self::default();
        for (key, value) in &clr_map.attributes {
            if !key.starts_with("xmlns") {
                result.map.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// Scheme slot for a logical name; slot names map to themselves.
    pub fn slot<'s>(&'s self, name: &'s str) -> &'s str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Resolve a `schemeClr/@val` to a hex value through this map and `theme`.
    pub fn resolve(&self, theme: &Theme, name: &str) -> Option<String> {
        theme.color(self.slot(name)).map(str::to_string)
    }
}
