//! ZIP container abstraction for OOXML packages.

use crate::error::{Error, Result};
use crate::xml::XmlElement;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Relationships of one part, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the content of a .rels file.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut rels = Self::new();
        if xml.trim().is_empty() {
            return Ok(rels);
        }

        let root = XmlElement::parse(xml)?;
        for el in root.children_named("Relationship") {
            let id = el.attr("Id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            rels.add(Relationship {
                id: id.to_string(),
                rel_type: el.attr("Type").unwrap_or_default().to_string(),
                target: el.attr("Target").unwrap_or_default().to_string(),
                external: el
                    .attr("TargetMode")
                    .is_some_and(|m| m.eq_ignore_ascii_case("external")),
            });
        }
        Ok(rels)
    }

    /// Serialize back to .rels XML.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS);
        for rel in &self.items {
            let mut el = XmlElement::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el.set_attr("TargetMode", "External");
            }
            root.append_element(el);
        }
        root.to_document_bytes()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get relationships by type.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items.iter().filter(|r| r.rel_type == rel_type).collect()
    }

    /// First relationship of a type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// All relationships in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a relationship, replacing any existing one with the same ID.
    pub fn add(&mut self, rel: Relationship) {
        self.items.retain(|r| r.id != rel.id);
        self.items.push(rel);
    }

    /// Add a relationship under a fresh ID and return that ID.
    pub fn add_new(&mut self, rel_type: &str, target: &str, external: bool) -> String {
        let id = self.next_id();
        self.add(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
        id
    }

    /// Remove a relationship by ID.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Smallest unused `rIdN` above every existing numeric ID.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Path of the .rels file that belongs to `part_path`.
    pub fn path_for(part_path: &str) -> String {
        if part_path.is_empty() || part_path == "/" {
            return "_rels/.rels".to_string();
        }
        match part_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part_path),
        }
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After UTF-16 content has been decoded into a Rust string the declaration
/// still names UTF-16, which quick-xml would then try to honour.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let content = decode_utf16_le(&bytes[2..])?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let content = decode_utf16_be(&bytes[2..])?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM: ASCII markup leaves zero bytes in alternating positions
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16_le(bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16_be(bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16_le(bytes: &[u8]) -> Result<String> {
    let len = bytes.len() & !1;
    let u16_iter = (0..len)
        .step_by(2)
        .map(|i| u16::from_le_bytes([bytes[i], bytes[i + 1]]));

    char::decode_utf16(u16_iter)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn decode_utf16_be(bytes: &[u8]) -> Result<String> {
    let len = bytes.len() & !1;
    let u16_iter = (0..len)
        .step_by(2)
        .map(|i| u16::from_be_bytes([bytes[i], bytes[i + 1]]));

    char::decode_utf16(u16_iter)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Pending changes applied when a container is written back out.
#[derive(Debug, Default)]
pub struct PackageChanges {
    /// New content for existing or added parts, keyed by part path
    pub parts: BTreeMap<String, Vec<u8>>,
    /// Parts to drop from the package
    pub removed: HashSet<String>,
}

impl PackageChanges {
    /// Record new content for a part.
    pub fn put(&mut self, path: impl Into<String>, data: Vec<u8>) {
        let path = path.into();
        self.removed.remove(&path);
        self.parts.insert(path, data);
    }

    /// Record removal of a part.
    pub fn remove(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.parts.remove(&path);
        self.removed.insert(path);
    }
}

/// OOXML container abstraction over a ZIP archive.
///
/// Reads XML parts, binary parts and relationships, and writes a new
/// archive with a set of [`PackageChanges`] applied.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use slidekit::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("deck.pptx")?;
    /// # Ok::<(), slidekit::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part as a string, handling UTF-8 and UTF-16 encodings.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read and parse an XML part into an element tree.
    pub fn read_element(&self, path: &str) -> Result<XmlElement> {
        XmlElement::parse(&self.read_xml(path)?)
    }

    /// Read a binary part.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let result = archive.file_names().any(|n| n == path);
        result
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read the relationships of a part; a missing .rels file yields an empty set.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = Relationships::path_for(part_path);
        match self.read_xml(&rels_path) {
            Ok(content) => Relationships::parse(&content),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Write the archive with `changes` applied.
    ///
    /// Untouched entries keep their original order; added parts follow in
    /// path order.
    pub fn write_to<W: Write + Seek>(&self, writer: W, changes: &PackageChanges) -> Result<W> {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let mut zip = zip::ZipWriter::new(writer);
        let mut written: HashSet<String> = HashSet::new();

        let mut archive = self.archive.borrow_mut();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            if changes.removed.contains(&name) {
                continue;
            }

            zip.start_file(name.as_str(), options)?;
            match changes.parts.get(&name) {
                Some(data) => zip.write_all(data)?,
                None => {
                    let mut data = Vec::new();
                    file.read_to_end(&mut data)?;
                    zip.write_all(&data)?;
                }
            }
            written.insert(name);
        }

        for (name, data) in &changes.parts {
            if written.contains(name) {
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?)
    }

    /// Resolve a relationship target relative to the part that owns it.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }

    /// Express `target` relative to the directory of `base`, as relationship targets are stored.
    pub fn relative_path(base: &str, target: &str) -> String {
        let base_dir: Vec<&str> = match base.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        };
        let target_parts: Vec<&str> = target.split('/').collect();

        let common = base_dir
            .iter()
            .zip(target_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = vec![".."; base_dir.len() - common];
        parts.extend(&target_parts[common..]);
        parts.join("/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
