//! Presentation sections (`p14:sectionLst` in the presentation extension list).

use crate::xml::XmlElement;
use serde::Serialize;

/// A named run of slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    /// 0-based positions of the member slides, in section order
    pub slides: Vec<usize>,
}

fn section_list(root: &XmlElement) -> Option<&XmlElement> {
    root.child("extLst")?
        .children_named("ext")
        .find_map(|ext| ext.child("sectionLst"))
}

fn section_list_mut(root: &mut XmlElement) -> Option<&mut XmlElement> {
    root.child_mut("extLst")?
        .elements_mut()
        .filter(|e| e.is("ext"))
        .find_map(|ext| ext.child_mut("sectionLst"))
}

/// Sections with member slides mapped to positions in `slide_ids`.
/// Ids that no longer name a slide are skipped.
pub(crate) fn read_sections(root: &XmlElement, slide_ids: &[u32]) -> Vec<Section> {
    let Some(list) = section_list(root) else {
        return Vec::new();
    };

    list.children_named("section")
        .map(|section| {
            let slides = section
                .child("sldIdLst")
                .map(|ids| {
                    ids.children_named("sldId")
                        .filter_map(|s| s.attr_parse::<u32>("id"))
                        .filter_map(|id| slide_ids.iter().position(|&s| s == id))
                        .collect()
                })
                .unwrap_or_default();
            Section {
                name: section.attr("name").unwrap_or_default().to_string(),
                slides,
            }
        })
        .collect()
}

/// Remove the first section named `name`. Returns whether one was found.
pub(crate) fn remove_section(root: &mut XmlElement, name: &str) -> bool {
    let Some(list) = section_list_mut(root) else {
        return false;
    };
    let Some(pos) = list
        .elements()
        .position(|s| s.is("section") && s.attr("name") == Some(name))
    else {
        return false;
    };
    list.remove_element(pos);
    true
}

/// Drop a removed slide's id from every section.
pub(crate) fn forget_slide(root: &mut XmlElement, slide_id: u32) {
    let Some(list) = section_list_mut(root) else {
        return;
    };
    let id = slide_id.to_string();
    for section in list.elements_mut() {
        if let Some(ids) = section.child_mut("sldIdLst") {
            loop {
                let found = ids.elements().position(|s| s.attr("id") == Some(id.as_str()));
                let Some(pos) = found else { break };
                ids.remove_element(pos);
            }
        }
    }
}
