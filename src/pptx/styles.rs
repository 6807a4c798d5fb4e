//! Level-keyed text style tables: list styles, master text styles and the
//! presentation default text style.

use super::font::FontProps;
use crate::xml::XmlElement;
use std::collections::BTreeMap;

/// Highest outline level with its own style entry (`a:lvl9pPr`).
pub(crate) const MAX_LEVEL: usize = 9;

/// Convert a 0-based `a:pPr/@lvl` into the 1-based level used by style tables.
pub(crate) fn style_level(lvl: Option<usize>) -> usize {
    (lvl.unwrap_or(0) + 1).clamp(1, MAX_LEVEL)
}

/// Run defaults for `level` in a list style (`a:lstStyle`, `p:bodyStyle`, ...).
pub(crate) fn level_font(list_style: &XmlElement, level: usize) -> Option<FontProps> {
    let level_name = format!("lvl{}pPr", level);
    let def_rpr = list_style.child(&level_name)?.child("defRPr")?;
    Some(FontProps::from_run_properties(def_rpr))
}

/// One of the three text style tables of a slide master (`p:txStyles`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MasterTextStyle {
    Title,
    Body,
    Other,
}

impl MasterTextStyle {
    fn element_name(&self) -> &'static str {
        match self {
            Self::Title => "titleStyle",
            Self::Body => "bodyStyle",
            Self::Other => "otherStyle",
        }
    }
}

/// Run defaults for `level` in a master text style table.
pub(crate) fn master_level_font(
    master_root: &XmlElement,
    style: MasterTextStyle,
    level: usize,
) -> Option<FontProps> {
    let table = master_root.path(&["txStyles", style.element_name()])?;
    level_font(table, level)
}

/// Per-level defaults from `p:defaultTextStyle`, with gaps filled from the
/// master's other-text style.
pub(crate) fn level_font_table(
    presentation_root: &XmlElement,
    master_root: Option<&XmlElement>,
) -> BTreeMap<usize, FontProps> {
    let defaults = presentation_root.child("defaultTextStyle");
    let mut table = BTreeMap::new();

    for level in 1..=MAX_LEVEL {
        let mut props = defaults
            .and_then(|s| level_font(s, level))
            .unwrap_or_default();
        if let Some(other) = master_root.and_then(|m| master_level_font(m, MasterTextStyle::Other, level)) {
            props.fill_from(&other);
        }
        if !props.is_empty() {
            table.insert(level, props);
        }
    }

    table
}
