//! Run fonts: explicit run properties, inherited style levels and the
//! resolved values callers see.

use super::fill::{parse_hex_color, ColorSpec, FILL_ELEMENTS};
use super::presentation::Presentation;
use super::resolve::referenced_shape;
use super::styles::{level_font, master_level_font, style_level, MasterTextStyle};
use super::text::{body_mut_of, body_of, paragraph_at, portion_at, portion_at_mut, PortionKey};
use crate::error::{Error, Result};
use crate::model::Placeholder;
use crate::options::DEFAULT_FONT_SIZE;
use crate::xml::XmlElement;
use log::debug;
use serde::Serialize;

/// Child order of `a:rPr` / `a:defRPr`.
pub(crate) const RUN_PROPERTIES_ORDER: &[&str] = &[
    "ln",
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// Run properties as written at one level of the chain. Unset fields fall
/// through to the next level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontProps {
    /// Size in points
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Latin typeface, possibly a theme reference (`+mn-lt`)
    pub latin: Option<String>,
    /// Underline style (`sng`, `dbl`, `none`, ...)
    pub underline: Option<String>,
    /// Baseline offset in percent
    pub offset: Option<f64>,
    pub color: Option<ColorSpec>,
}

impl FontProps {
    /// Read an `a:rPr`, `a:defRPr` or `a:endParaRPr` element.
    pub fn from_run_properties(rpr: &XmlElement) -> Self {
        Self {
            size: rpr.attr_parse::<f64>("sz").map(|sz| sz / 100.0),
            bold: rpr.attr_bool("b"),
            italic: rpr.attr_bool("i"),
            latin: rpr
                .child("latin")
                .and_then(|l| l.attr("typeface"))
                .map(str::to_string),
            underline: rpr.attr("u").map(str::to_string),
            offset: rpr.attr_parse::<f64>("baseline").map(|b| b / 1000.0),
            color: rpr.child("solidFill").and_then(ColorSpec::from_fill),
        }
    }

    /// Take every field this level leaves unset from `other`.
    pub fn fill_from(&mut self, other: &FontProps) {
        if self.size.is_none() {
            self.size = other.size;
        }
        if self.bold.is_none() {
            self.bold = other.bold;
        }
        if self.italic.is_none() {
            self.italic = other.italic;
        }
        if self.latin.is_none() {
            self.latin.clone_from(&other.latin);
        }
        if self.underline.is_none() {
            self.underline.clone_from(&other.underline);
        }
        if self.offset.is_none() {
            self.offset = other.offset;
        }
        if self.color.is_none() {
            self.color.clone_from(&other.color);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Effective font of a portion after walking the inheritance chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFont {
    /// Size in points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    /// Concrete latin typeface
    pub latin_name: String,
    /// Underline style, `None` when not underlined
    pub underline: Option<String>,
    /// Baseline offset in percent (positive is superscript)
    pub offset: f64,
    /// Hex colour when one is set anywhere in the chain
    pub color: Option<String>,
}

/// Resolve the font of a portion. Cached until the owning part changes.
pub(crate) fn resolve_font(pres: &Presentation, key: &PortionKey) -> Result<ResolvedFont> {
    if let Some(cached) = pres.cache.borrow().get_font(key) {
        return Ok(cached);
    }

    let shape_key = &key.text.shape;
    let shape_el = pres.element(shape_key)?;
    let body = body_of(shape_el, key.text.cell)
        .ok_or_else(|| Error::MissingComponent(format!("{}: text body", shape_key)))?;
    let paragraph = paragraph_at(body, key.paragraph)
        .ok_or_else(|| Error::InvalidData(format!("{}: paragraph {}", shape_key, key.paragraph)))?;
    let portion = portion_at(paragraph, key.portion)
        .ok_or_else(|| Error::InvalidData(format!("{}: portion {}", shape_key, key.portion)))?;

    let level = style_level(paragraph.path(&["pPr"]).and_then(|p| p.attr_parse("lvl")));
    let mut props = portion
        .child("rPr")
        .map(FontProps::from_run_properties)
        .unwrap_or_default();

    if let Some(own) = body.child("lstStyle").and_then(|l| level_font(l, level)) {
        props.fill_from(&own);
    }

    if key.text.cell.is_none() {
        if let Some(placeholder) = Placeholder::of_shape(shape_el) {
            fill_from_placeholder_chain(pres, key, placeholder, level, &mut props)?;
        }
    }

    if props.size.is_none() {
        props.size = pres.level_font(level).and_then(|f| f.size);
    }

    let theme = pres.theme_for(shape_key.part);
    let latin_name = match (&props.latin, theme) {
        (Some(typeface), Some(theme)) => theme.resolve_typeface(typeface),
        (Some(typeface), None) => typeface.clone(),
        (None, Some(theme)) => theme.minor_latin.clone(),
        (None, None) => String::new(),
    };
    let color = props.color.as_ref().and_then(|c| c.resolve(pres, shape_key.part));

    let resolved = ResolvedFont {
        size: props.size.unwrap_or(DEFAULT_FONT_SIZE),
        bold: props.bold.unwrap_or(false),
        italic: props.italic.unwrap_or(false),
        latin_name,
        underline: props.underline.filter(|u| u != "none"),
        offset: props.offset.unwrap_or(0.0),
        color,
    };
    pres.cache.borrow_mut().put_font(key.clone(), resolved.clone());
    Ok(resolved)
}

/// Layout and master list styles along the placeholder chain, then the
/// master text style for the placeholder's kind.
fn fill_from_placeholder_chain(
    pres: &Presentation,
    key: &PortionKey,
    placeholder: Placeholder,
    level: usize,
    props: &mut FontProps,
) -> Result<()> {
    let mut placeholder_type = placeholder.placeholder_type;
    let mut current = referenced_shape(pres, &key.text.shape);
    while let Some(reference) = current {
        let el = pres.element(&reference)?;
        if placeholder_type.is_none() {
            placeholder_type = Placeholder::of_shape(el).and_then(|p| p.placeholder_type);
        }
        if let Some(inherited) = el
            .path(&["txBody", "lstStyle"])
            .and_then(|l| level_font(l, level))
        {
            debug!("{}: font level {} from {}", key.text.shape, level, reference);
            props.fill_from(&inherited);
        }
        current = referenced_shape(pres, &reference);
    }

    let Some(master) = pres.master_entry(key.text.shape.part) else {
        return Ok(());
    };
    let styles = if placeholder_type.is_some_and(|t| t.is_title()) {
        vec![(MasterTextStyle::Title, 1)]
    } else {
        vec![(MasterTextStyle::Body, level), (MasterTextStyle::Other, level)]
    };
    for (style, lvl) in styles {
        if let Some(p) = master_level_font(&master.xml.root, style, lvl) {
            props.fill_from(&p);
        }
    }
    Ok(())
}

/// Read-only view of a portion's font.
#[derive(Clone)]
pub struct Font<'a> {
    pres: &'a Presentation,
    key: PortionKey,
}

impl<'a> Font<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: PortionKey) -> Self {
        Self { pres, key }
    }

    /// All resolved values at once.
    pub fn resolved(&self) -> Result<ResolvedFont> {
        resolve_font(self.pres, &self.key)
    }

    /// Size in points.
    pub fn size(&self) -> Result<f64> {
        Ok(self.resolved()?.size)
    }

    pub fn bold(&self) -> Result<bool> {
        Ok(self.resolved()?.bold)
    }

    pub fn italic(&self) -> Result<bool> {
        Ok(self.resolved()?.italic)
    }

    /// Latin typeface with theme references replaced.
    pub fn latin_name(&self) -> Result<String> {
        Ok(self.resolved()?.latin_name)
    }

    pub fn underlined(&self) -> Result<bool> {
        Ok(self.resolved()?.underline.is_some())
    }

    /// Baseline offset in percent.
    pub fn offset(&self) -> Result<f64> {
        Ok(self.resolved()?.offset)
    }

    pub fn color(&self) -> Result<Option<String>> {
        Ok(self.resolved()?.color)
    }
}

/// Editable view of a portion's font. Every setter writes the run's own
/// `a:rPr`, creating it when absent.
pub struct FontMut<'a> {
    pres: &'a mut Presentation,
    key: PortionKey,
}

impl<'a> FontMut<'a> {
    pub(crate) fn new(pres: &'a mut Presentation, key: PortionKey) -> Self {
        Self { pres, key }
    }

    pub fn as_font(&self) -> Font<'_> {
        Font::new(self.pres, self.key.clone())
    }

    fn run_properties(&mut self) -> Result<&mut XmlElement> {
        let key = &self.key;
        let shape_el = self.pres.element_mut(&key.text.shape)?;
        let body = body_mut_of(shape_el, key.text.cell)
            .ok_or_else(|| Error::MissingComponent(format!("{}: text body", key.text.shape)))?;
        let portion = portion_at_mut(body, key.paragraph, key.portion).ok_or_else(|| {
            Error::InvalidData(format!(
                "{}: portion {}/{}",
                key.text.shape, key.paragraph, key.portion
            ))
        })?;
        Ok(portion.ensure_child_at("a:rPr", 0))
    }

    /// Size in points.
    pub fn set_size(&mut self, points: f64) -> Result<()> {
        if !(points > 0.0 && points.is_finite()) {
            return Err(Error::InvalidMutation(format!("font size {}", points)));
        }
        let hundredths = (points * 100.0).round() as i64;
        self.run_properties()?.set_attr("sz", hundredths.to_string());
        Ok(())
    }

    pub fn set_bold(&mut self, bold: bool) -> Result<()> {
        self.run_properties()?.set_attr("b", if bold { "1" } else { "0" });
        Ok(())
    }

    pub fn set_italic(&mut self, italic: bool) -> Result<()> {
        self.run_properties()?.set_attr("i", if italic { "1" } else { "0" });
        Ok(())
    }

    /// Single underline on, or no underline.
    pub fn set_underlined(&mut self, underlined: bool) -> Result<()> {
        self.run_properties()?
            .set_attr("u", if underlined { "sng" } else { "none" });
        Ok(())
    }

    /// Baseline offset in percent; 0 clears it.
    pub fn set_offset(&mut self, percent: f64) -> Result<()> {
        let rpr = self.run_properties()?;
        if percent == 0.0 {
            rpr.remove_attr("baseline");
        } else {
            rpr.set_attr("baseline", ((percent * 1000.0).round() as i64).to_string());
        }
        Ok(())
    }

    pub fn set_latin_name(&mut self, typeface: &str) -> Result<()> {
        let rpr = self.run_properties()?;
        rpr.ensure_child_ordered("a:latin", RUN_PROPERTIES_ORDER)
            .set_attr("typeface", typeface);
        Ok(())
    }

    /// Solid colour from a 6-digit hex value (`#` optional).
    pub fn set_color(&mut self, hex: &str) -> Result<()> {
        let hex = parse_hex_color(hex)?;
        let rpr = self.run_properties()?;
        for name in FILL_ELEMENTS {
            rpr.remove_children(name);
        }
        rpr.ensure_child_ordered("a:solidFill", RUN_PROPERTIES_ORDER)
            .append_element(XmlElement::new("a:srgbClr").with_attr("val", hex));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_run_properties() {
        let rpr = XmlElement::parse(
            r#"<a:rPr xmlns:a="urn:a" sz="2450" b="1" u="sng" baseline="30000">
                 <a:solidFill><a:schemeClr val="accent1"/></a:solidFill>
                 <a:latin typeface="+mj-lt"/>
               </a:rPr>"#,
        )
        .unwrap();
        let props = FontProps::from_run_properties(&rpr);
        assert_eq!(props.size, Some(24.5));
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, None);
        assert_eq!(props.latin.as_deref(), Some("+mj-lt"));
        assert_eq!(props.underline.as_deref(), Some("sng"));
        assert_eq!(props.offset, Some(30.0));
        assert_eq!(props.color, Some(ColorSpec::Scheme("accent1".into())));
    }

    #[test]
    fn test_fill_from_keeps_own_values() {
        let mut own = FontProps {
            size: Some(12.0),
            ..Default::default()
        };
        let inherited = FontProps {
            size: Some(40.0),
            bold: Some(true),
            ..Default::default()
        };
        own.fill_from(&inherited);
        assert_eq!(own.size, Some(12.0));
        assert_eq!(own.bold, Some(true));
        assert!(!own.is_empty());
        assert!(FontProps::default().is_empty());
    }
}
