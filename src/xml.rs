//! Owned XML element tree used for every editable package part.
//!
//! Parts are parsed once with quick-xml into [`XmlElement`] trees, edited in
//! place, and serialized back on save. Element lookups match on the local
//! name (`"xfrm"` matches `a:xfrm` and `p:xfrm`) unless the query carries a
//! prefix, in which case the qualified name must match exactly.

use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::str::FromStr;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment (kept verbatim)
    Comment(String),
}

/// An XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name, e.g. `p:sp`
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

fn local_part(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

impl XmlElement {
    /// Create an empty element with a qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlParse("unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t.unescape()?;
                        top.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                        top.children.push(XmlNode::CData(text));
                    }
                }
                Event::Comment(c) => {
                    if let Some(top) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                        top.children.push(XmlNode::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlParse("unclosed element at end of input".to_string()));
        }
        root.ok_or_else(|| Error::XmlParse("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None => *root = Some(element),
        }
    }

    /// Serialize as a standalone document with an XML declaration.
    pub fn to_document_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.get_mut().extend_from_slice(b"\r\n");
        self.write_into(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_into(writer)?,
                XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
                XmlNode::CData(c) => writer.write_event(Event::CData(BytesCData::new(c.as_str())))?,
                XmlNode::Comment(c) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    /// Local part of the qualified name.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether this element matches `name` (local, or qualified when it has a prefix).
    pub fn is(&self, name: &str) -> bool {
        if name.contains(':') {
            self.name == name
        } else {
            self.local_name() == name
        }
    }

    /// Attribute value by qualified key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute parsed into `T`; `None` when absent or unparsable.
    pub fn attr_parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.attr(key).and_then(|v| v.trim().parse().ok())
    }

    /// OOXML boolean attribute (`1`, `true`, `on`).
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attr(key).map(|v| matches!(v, "1" | "true" | "on"))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Element children in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable element children in document order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Number of element children.
    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// The `index`-th element child.
    pub fn element_at(&self, index: usize) -> Option<&XmlElement> {
        self.elements().nth(index)
    }

    /// The `index`-th element child, mutably.
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        self.elements_mut().nth(index)
    }

    /// First child element matching `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    /// First child element matching `name`, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// All child elements matching `name`.
    pub fn children_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s XmlElement> {
        self.elements().filter(move |e| e.is(name))
    }

    /// Follow a chain of child names.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Follow a chain of child names, mutably.
    pub fn path_mut(&mut self, names: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for name in names {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// First descendant (depth first, excluding self) matching `name`.
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.is(name) {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching `name`, in document order.
    pub fn descendants<'s>(&'s self, name: &str, out: &mut Vec<&'s XmlElement>) {
        for child in self.elements() {
            if child.is(name) {
                out.push(child);
            }
            child.descendants(name, out);
        }
    }

    /// Node index of the `index`-th element child, or `children.len()` past the end.
    fn node_index_of_element(&self, index: usize) -> usize {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, XmlNode::Element(_)))
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(self.children.len())
    }

    /// Insert `child` so that it becomes the `index`-th element child.
    pub fn insert_element(&mut self, index: usize, child: XmlElement) -> &mut XmlElement {
        let at = self.node_index_of_element(index);
        self.children.insert(at, XmlNode::Element(child));
        match &mut self.children[at] {
            XmlNode::Element(e) => e,
            _ => unreachable!("element was just inserted"),
        }
    }

    /// Append a child element.
    pub fn append_element(&mut self, child: XmlElement) -> &mut XmlElement {
        let count = self.element_count();
        self.insert_element(count, child)
    }

    /// Remove the `index`-th element child.
    pub fn remove_element(&mut self, index: usize) -> Option<XmlElement> {
        let at = self.node_index_of_element(index);
        if at >= self.children.len() {
            return None;
        }
        match self.children.remove(at) {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Remove every child element matching `name`; returns how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.is(name)));
        before - self.children.len()
    }

    /// Element index of the first child matching `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.elements().position(|e| e.is(name))
    }

    /// Get the first child matching `name`, inserting `XmlElement::new(qualified)` at `index` if absent.
    pub fn ensure_child_at(&mut self, qualified: &str, index: usize) -> &mut XmlElement {
        match self.position_of(qualified) {
            Some(pos) => match self.element_at_mut(pos) {
                Some(e) => e,
                None => unreachable!("position_of returned a valid index"),
            },
            None => self.insert_element(index, XmlElement::new(qualified)),
        }
    }

    /// Get the first child matching `name`, appending it if absent.
    pub fn ensure_child(&mut self, qualified: &str) -> &mut XmlElement {
        let count = self.element_count();
        self.ensure_child_at(qualified, count)
    }

    /// Get the first child matching `qualified`, inserting it where the schema
    /// sequence `order` (local names) puts it if absent. Unknown names sort last.
    pub fn ensure_child_ordered(&mut self, qualified: &str, order: &[&str]) -> &mut XmlElement {
        let rank = |local: &str| order.iter().position(|n| *n == local).unwrap_or(order.len());
        let own_rank = rank(local_part(qualified));
        let index = self
            .elements()
            .take_while(|e| rank(e.local_name()) <= own_rank)
            .count();
        self.ensure_child_at(qualified, index)
    }

    /// Concatenated direct character data.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlNode::Text(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sp xmlns:p="urn:p" xmlns:a="urn:a">
  <p:nvSpPr><p:cNvPr id="2" name="Title &amp; More"/></p:nvSpPr>
  <p:spPr><a:xfrm><a:off x="10" y="20"/></a:xfrm></p:spPr>
  <p:txBody><a:p><a:r><a:t> keep  spaces </a:t></a:r></a:p></p:txBody>
</p:sp>"#;

    #[test]
    fn test_parse_and_navigate() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert_eq!(root.name, "p:sp");
        assert_eq!(root.local_name(), "sp");
        assert_eq!(root.element_count(), 3);

        let c_nv_pr = root.path(&["nvSpPr", "cNvPr"]).unwrap();
        assert_eq!(c_nv_pr.attr("name"), Some("Title & More"));
        assert_eq!(c_nv_pr.attr_parse::<u32>("id"), Some(2));

        let off = root.path(&["spPr", "xfrm", "off"]).unwrap();
        assert_eq!(off.attr_parse::<i64>("y"), Some(20));

        let t = root.descendant("t").unwrap();
        assert_eq!(t.text(), " keep  spaces ");
    }

    #[test]
    fn test_qualified_lookup() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert!(root.child("p:spPr").is_some());
        assert!(root.child("a:spPr").is_none());
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        let bytes = root.to_document_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("Title &amp; More"));

        let reparsed = XmlElement::parse(&text).unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_insert_and_remove_elements() {
        let mut root = XmlElement::parse("<r><b/>\n<c/></r>").unwrap();
        root.insert_element(0, XmlElement::new("a"));
        let names: Vec<_> = root.elements().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let removed = root.remove_element(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(root.element_count(), 2);

        root.ensure_child("d").set_attr("v", "1");
        root.ensure_child("d").set_attr("v", "2");
        assert_eq!(root.children_named("d").count(), 1);
        assert_eq!(root.child("d").unwrap().attr("v"), Some("2"));

        assert_eq!(root.remove_children("d"), 1);
        assert!(root.child("d").is_none());
    }

    #[test]
    fn test_parse_rejects_unclosed() {
        assert!(XmlElement::parse("<a><b></b>").is_err());
        assert!(XmlElement::parse("").is_err());
    }

    #[test]
    fn test_ensure_child_ordered() {
        let order = ["ln", "solidFill", "latin", "ea", "hlinkClick"];
        let mut rpr = XmlElement::parse("<a:rPr><a:ln/><a:ea/></a:rPr>").unwrap();
        rpr.ensure_child_ordered("a:latin", &order);
        rpr.ensure_child_ordered("a:solidFill", &order);
        rpr.ensure_child_ordered("a:hlinkClick", &order);
        let names: Vec<_> = rpr.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(names, vec!["ln", "solidFill", "latin", "ea", "hlinkClick"]);
    }
}
