//! Memoized resolution results.
//!
//! Every mutable access to a part goes through `Presentation::part_mut`,
//! which calls [`ResolveCache::invalidate`] before handing out the part.

use super::font::ResolvedFont;
use super::text::{PortionKey, TextLocation};
use crate::model::{PartRef, ResolvedBox, ShapeKey};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ResolveCache {
    boxes: HashMap<ShapeKey, ResolvedBox>,
    fonts: HashMap<PortionKey, ResolvedFont>,
    texts: HashMap<TextLocation, String>,
}

impl ResolveCache {
    pub fn get_box(&self, key: &ShapeKey) -> Option<ResolvedBox> {
        self.boxes.get(key).copied()
    }

    pub fn put_box(&mut self, key: ShapeKey, value: ResolvedBox) {
        self.boxes.insert(key, value);
    }

    pub fn get_font(&self, key: &PortionKey) -> Option<ResolvedFont> {
        self.fonts.get(key).cloned()
    }

    pub fn put_font(&mut self, key: PortionKey, value: ResolvedFont) {
        self.fonts.insert(key, value);
    }

    pub fn get_text(&self, key: &TextLocation) -> Option<String> {
        self.texts.get(key).cloned()
    }

    pub fn put_text(&mut self, key: TextLocation, value: String) {
        self.texts.insert(key, value);
    }

    /// Drop entries that may depend on `part`.
    ///
    /// Slide entries only depend on their own slide; layouts and masters feed
    /// every slide below them, so those clear everything.
    pub fn invalidate(&mut self, part: PartRef) {
        match part {
            PartRef::Slide(_) => {
                self.boxes.retain(|k, _| k.part != part);
                self.fonts.retain(|k, _| k.text.shape.part != part);
                self.texts.retain(|k, _| k.shape.part != part);
            }
            PartRef::Layout(_) | PartRef::Master(_) => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.fonts.clear();
        self.texts.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.fonts.len() + self.texts.len()
    }
}
