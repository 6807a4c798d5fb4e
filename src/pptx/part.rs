//! Editable XML parts and the relationship/content type vocabulary.

use crate::container::{OoxmlContainer, PackageChanges, Relationships};
use crate::error::{Error, Result};
use crate::xml::XmlElement;

/// Relationship type URIs.
pub(crate) mod rel_types {
    const BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

    /// Whether `rel_type` is the officeDocument relationship `name` (`slide`, `chart`, ...).
    pub fn is(rel_type: &str, name: &str) -> bool {
        rel_type
            .strip_prefix(BASE)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| rest == name)
    }
}

/// Content type of slide parts.
pub(crate) const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// A parsed XML part with its relationships.
#[derive(Debug, Clone)]
pub(crate) struct XmlPart {
    /// Package path, e.g. `ppt/slides/slide1.xml`
    pub path: String,
    pub root: XmlElement,
    pub rels: Relationships,
    pub dirty: bool,
    pub rels_dirty: bool,
}

impl XmlPart {
    pub fn load(container: &OoxmlContainer, path: &str) -> Result<Self> {
        Ok(Self {
            path: path.to_string(),
            root: container.read_element(path)?,
            rels: container.read_relationships(path)?,
            dirty: false,
            rels_dirty: false,
        })
    }

    /// A part that does not exist in the package yet.
    pub fn new(path: impl Into<String>, root: XmlElement, rels: Relationships) -> Self {
        Self {
            path: path.into(),
            root,
            rels,
            dirty: true,
            rels_dirty: true,
        }
    }

    /// `p:cSld/p:spTree`.
    pub fn shape_tree(&self) -> Result<&XmlElement> {
        self.root
            .path(&["cSld", "spTree"])
            .ok_or_else(|| Error::MissingComponent(format!("{}: p:cSld/p:spTree", self.path)))
    }

    pub fn shape_tree_mut(&mut self) -> Result<&mut XmlElement> {
        let path = self.path.clone();
        self.root
            .path_mut(&["cSld", "spTree"])
            .ok_or_else(|| Error::MissingComponent(format!("{}: p:cSld/p:spTree", path)))
    }

    /// Package path of an internal relationship target.
    pub fn target_path(&self, rel_id: &str) -> Option<String> {
        let rel = self.rels.get(rel_id).filter(|r| !r.external)?;
        Some(OoxmlContainer::resolve_path(&self.path, &rel.target))
    }

    /// Package path of the first internal target of a relationship type.
    pub fn target_path_by_type(&self, rel_type: &str) -> Option<String> {
        let rel = self.rels.first_of_type(rel_type).filter(|r| !r.external)?;
        Some(OoxmlContainer::resolve_path(&self.path, &rel.target))
    }

    /// Add changed content of this part to `changes`.
    pub fn stage(&self, changes: &mut PackageChanges) -> Result<()> {
        if self.dirty {
            changes.put(self.path.clone(), self.root.to_document_bytes()?);
        }
        if self.rels_dirty {
            changes.put(Relationships::path_for(&self.path), self.rels.to_xml_bytes()?);
        }
        Ok(())
    }
}
