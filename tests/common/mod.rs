//! Synthetic presentation packages for integration tests.

#![allow(dead_code)]

use slidekit::{Presentation, PresentationOptions};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const TREE_HEAD: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

const COLOR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

/// A slide to put in the deck.
#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    shapes: String,
    /// (id, relationship name such as `image`, target relative to the slide)
    rels: Vec<(String, String, String)>,
}

/// Builds a one-master, one-layout presentation package.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    master_shapes: String,
    text_styles: String,
    layout_shapes: String,
    default_text_style: String,
    sections: String,
    slides: Vec<SlideSpec>,
    parts: Vec<(String, Vec<u8>)>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn master_shapes(mut self, xml: &str) -> Self {
        self.master_shapes = xml.to_string();
        self
    }

    /// Content of `p:txStyles`.
    pub fn text_styles(mut self, xml: &str) -> Self {
        self.text_styles = xml.to_string();
        self
    }

    pub fn layout_shapes(mut self, xml: &str) -> Self {
        self.layout_shapes = xml.to_string();
        self
    }

    /// Content of `p:defaultTextStyle` in the presentation part.
    pub fn default_text_style(mut self, xml: &str) -> Self {
        self.default_text_style = xml.to_string();
        self
    }

    /// Content of `p14:sectionLst`.
    pub fn sections(mut self, xml: &str) -> Self {
        self.sections = xml.to_string();
        self
    }

    pub fn slide(mut self, shapes: &str) -> Self {
        self.slides.push(SlideSpec {
            shapes: shapes.to_string(),
            rels: Vec::new(),
        });
        self
    }

    /// Slide with extra relationships `(id, name, target)`.
    pub fn slide_with_rels(mut self, shapes: &str, rels: &[(&str, &str, &str)]) -> Self {
        self.slides.push(SlideSpec {
            shapes: shapes.to_string(),
            rels: rels
                .iter()
                .map(|(id, name, target)| (id.to_string(), name.to_string(), target.to_string()))
                .collect(),
        });
        self
    }

    /// Extra package part (media, charts).
    pub fn part(mut self, path: &str, data: &[u8]) -> Self {
        self.parts.push((path.to_string(), data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut put = |path: &str, data: &[u8]| {
            zip.start_file(path, options).unwrap();
            zip.write_all(data).unwrap();
        };

        let mut overrides = String::new();
        let mut override_part = |path: &str, kind: &str| {
            overrides.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.{}+xml"/>"#,
                path, kind
            ));
        };
        override_part("ppt/presentation.xml", "presentationml.presentation.main");
        override_part("ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster");
        override_part("ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout");
        override_part("ppt/theme/theme1.xml", "theme");
        for i in 0..self.slides.len() {
            override_part(&format!("ppt/slides/slide{}.xml", i + 1), "presentationml.slide");
        }
        put(
            "[Content_Types].xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="mp4" ContentType="video/mp4"/>{}</Types>"#,
                overrides
            )
            .as_bytes(),
        );

        put(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]).as_bytes(),
        );

        let mut presentation_rels = vec![(
            "rId1".to_string(),
            "slideMaster".to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        let mut slide_ids = String::new();
        for i in 0..self.slides.len() {
            let rel_id = format!("rId{}", i + 2);
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id));
            presentation_rels.push((rel_id, "slide".to_string(), format!("slides/slide{}.xml", i + 1)));
        }
        let sections = if self.sections.is_empty() {
            String::new()
        } else {
            format!(
                r#"<p:extLst><p:ext uri="{{521415D9-36F7-43E2-AB2F-B90AF26B5E84}}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main">{}</p14:sectionLst></p:ext></p:extLst>"#,
                self.sections
            )
        };
        put(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle>{}</p:defaultTextStyle>{}</p:presentation>"#,
                NS, slide_ids, self.default_text_style, sections
            )
            .as_bytes(),
        );
        put("ppt/_rels/presentation.xml.rels", owned_rels(&presentation_rels).as_bytes());

        put(
            "ppt/slideMasters/slideMaster1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld>{}<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles>{}</p:txStyles></p:sldMaster>"#,
                NS, TREE_HEAD, self.master_shapes, COLOR_MAP, self.text_styles
            )
            .as_bytes(),
        );
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ])
            .as_bytes(),
        );
        put("ppt/theme/theme1.xml", THEME.as_bytes());

        put(
            "ppt/slideLayouts/slideLayout1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {} type="obj"><p:cSld name="Title and Content"><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
                NS, TREE_HEAD, self.layout_shapes
            )
            .as_bytes(),
        );
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).as_bytes(),
        );

        for (i, slide) in self.slides.iter().enumerate() {
            put(
                &format!("ppt/slides/slide{}.xml", i + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                    NS, TREE_HEAD, slide.shapes
                )
                .as_bytes(),
            );
            let mut slide_rels = vec![(
                "rId1".to_string(),
                "slideLayout".to_string(),
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            slide_rels.extend(slide.rels.iter().cloned());
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                owned_rels(&slide_rels).as_bytes(),
            );
        }

        for (path, data) in &self.parts {
            put(path, data);
        }

        zip.finish().unwrap().into_inner()
    }

    pub fn open(&self) -> Presentation {
        Presentation::from_bytes(self.build()).unwrap()
    }

    pub fn open_with(&self, options: PresentationOptions) -> Presentation {
        Presentation::from_bytes_with_options(self.build(), options).unwrap()
    }
}

fn rels(items: &[(&str, &str, &str)]) -> String {
    let owned: Vec<(String, String, String)> = items
        .iter()
        .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()))
        .collect();
    owned_rels(&owned)
}

fn owned_rels(items: &[(String, String, String)]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, name, target) in items {
        let mode = if target.starts_with("http") {
            r#" TargetMode="External""#
        } else {
            ""
        };
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
            id, REL, name, target, mode
        ));
    }
    out.push_str("</Relationships>");
    out
}

/// `p:sp` with optional placeholder, transform and text body content.
pub fn sp(id: u32, name: &str, ph: Option<&str>, xfrm: Option<(i64, i64, i64, i64)>, body: Option<&str>) -> String {
    let nv_pr = match ph {
        Some(ph) => format!("<p:nvPr>{}</p:nvPr>", ph),
        None => "<p:nvPr/>".to_string(),
    };
    let sp_pr = match xfrm {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    let tx_body = body
        .map(|b| format!("<p:txBody>{}</p:txBody>", b))
        .unwrap_or_default();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/>{}</p:nvSpPr>{}{}</p:sp>"#,
        id, name, nv_pr, sp_pr, tx_body
    )
}

/// `p:grpSp` with `(off, ext, chOff, chExt)` as `(x, y, cx, cy)` boxes.
pub fn grp(id: u32, name: &str, outer: (i64, i64, i64, i64), child: (i64, i64, i64, i64), children: &str) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="{}" name="{}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/><a:chOff x="{}" y="{}"/><a:chExt cx="{}" cy="{}"/></a:xfrm></p:grpSpPr>{}</p:grpSp>"#,
        id, name, outer.0, outer.1, outer.2, outer.3, child.0, child.1, child.2, child.3, children
    )
}

/// Text body content with one paragraph per line and the given run properties.
pub fn body(body_pr: &str, rpr: &str, lines: &[&str]) -> String {
    let paragraphs: String = lines
        .iter()
        .map(|l| format!("<a:p><a:r>{}<a:t>{}</a:t></a:r></a:p>", rpr, l))
        .collect();
    format!("{}<a:lstStyle/>{}", body_pr, paragraphs)
}

/// EMU for a pixel count at 96 dpi.
pub fn px(value: i64) -> i64 {
    value * 9525
}
