//! Benchmarks for slidekit resolution performance.
//!
//! Run with: cargo bench
//!
//! Decks are synthetic: every slide holds placeholders that inherit their
//! geometry and fonts from one layout and master, plus a nested group.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use slidekit::Presentation;
use std::io::{Cursor, Write};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const TREE_HEAD: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn rels(items: &[(String, &str, String)]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in items {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL, kind, target
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn placeholder(id: u32, name: &str, ph: &str, xfrm: &str, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id, name, ph, xfrm, text
    )
}

fn xfrm(x: i64, y: i64, cx: i64, cy: i64) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    )
}

/// Creates a synthetic deck with the given number of slides.
fn create_test_pptx(slide_count: usize) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut put = |path: &str, data: &str| {
        zip.start_file(path, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    };

    let mut overrides = String::new();
    for i in 1..=slide_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i
        ));
    }
    put(
        "[Content_Types].xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>{}</Types>"#,
            overrides
        ),
    );
    put(
        "_rels/.rels",
        &rels(&[("rId1".into(), "officeDocument", "ppt/presentation.xml".into())]),
    );

    let mut presentation_rels = vec![("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string())];
    let mut slide_ids = String::new();
    for i in 0..slide_count {
        let rel_id = format!("rId{}", i + 2);
        slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id));
        presentation_rels.push((rel_id, "slide", format!("slides/slide{}.xml", i + 1)));
    }
    put(
        "ppt/presentation.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#,
            NS, slide_ids
        ),
    );
    put("ppt/_rels/presentation.xml.rels", &rels(&presentation_rels));

    let master_shapes = format!(
        "{}{}",
        placeholder(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, &xfrm(838200, 365125, 10515600, 1325563), ""),
        placeholder(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, &xfrm(838200, 1825625, 10515600, 4351338), ""),
    );
    put(
        "ppt/slideMasters/slideMaster1.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr><a:defRPr sz="2800"/></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#,
            NS, TREE_HEAD, master_shapes
        ),
    );
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &rels(&[
            ("rId1".into(), "slideLayout", "../slideLayouts/slideLayout1.xml".into()),
            ("rId2".into(), "theme", "../theme/theme1.xml".into()),
        ]),
    );
    put(
        "ppt/theme/theme1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#,
    );

    // the layout overrides the title only, the body falls through to the master
    let layout_shapes = format!(
        "{}{}",
        placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, &xfrm(838200, 500000, 10515600, 1000000), ""),
        placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, "", ""),
    );
    put(
        "ppt/slideLayouts/slideLayout1.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {} type="obj"><p:cSld name="Title and Content"><p:spTree>{}{}</p:spTree></p:cSld></p:sldLayout>"#,
            NS, TREE_HEAD, layout_shapes
        ),
    );
    put(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &rels(&[("rId1".into(), "slideMaster", "../slideMasters/slideMaster1.xml".into())]),
    );

    for i in 1..=slide_count {
        let group = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="10" name="Group 9"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="952500" y="952500"/><a:ext cx="1905000" cy="1905000"/><a:chOff x="0" y="0"/><a:chExt cx="1905000" cy="1905000"/></a:xfrm></p:grpSpPr>{}</p:grpSp>"#,
            placeholder(11, "Child", "", &xfrm(476250, 476250, 476250, 476250), "grouped")
        );
        put(
            &format!("ppt/slides/slide{}.xml", i),
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}{}{}{}</p:spTree></p:cSld></p:sld>"#,
                NS,
                TREE_HEAD,
                placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, "", &format!("Slide {}", i)),
                placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, "", "Body text for benchmarking purposes."),
                group
            ),
        );
        put(
            &format!("ppt/slides/_rels/slide{}.xml.rels", i),
            &rels(&[("rId1".into(), "slideLayout", "../slideLayouts/slideLayout1.xml".into())]),
        );
    }

    zip.finish().unwrap().into_inner()
}

/// Resolve geometry and the first run's font of every shape.
fn resolve_all(pres: &Presentation) -> i64 {
    let mut total = 0;
    for slide in pres.slides() {
        for shape in slide.all_shapes() {
            total += shape.x().unwrap_or_default() + shape.width().unwrap_or_default();
            if let Some(frame) = shape.text_frame() {
                if let Some(portion) = frame.paragraph(0).and_then(|p| p.portion(0)) {
                    total += portion.font().size().unwrap_or_default() as i64;
                }
            }
        }
    }
    total
}

/// Benchmark opening a package.
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    for slide_count in [10, 100, 500].iter() {
        let data = create_test_pptx(*slide_count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("slides", slide_count), &data, |b, data| {
            b.iter(|| {
                let _ = Presentation::from_bytes(black_box(data.clone()));
            });
        });
    }

    group.finish();
}

/// Benchmark inherited geometry and font resolution with a cold cache.
fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for slide_count in [10, 100, 500].iter() {
        let data = create_test_pptx(*slide_count);
        group.bench_with_input(BenchmarkId::new("slides", slide_count), &data, |b, data| {
            b.iter_batched(
                || Presentation::from_bytes(data.clone()).unwrap(),
                |pres| black_box(resolve_all(&pres)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark moving a grouped shape outside its group.
fn bench_group_propagation(c: &mut Criterion) {
    let data = create_test_pptx(1);

    c.bench_function("group_propagation", |b| {
        b.iter_batched(
            || {
                let pres = Presentation::from_bytes(data.clone()).unwrap();
                let key = pres.find_shape(0, "Child").unwrap();
                (pres, key)
            },
            |(mut pres, key)| {
                let mut shape = pres.shape_mut(&key).unwrap();
                shape.set_x(black_box(20)).unwrap();
                shape.set_y(black_box(20)).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_open,
    bench_resolution,
    bench_group_propagation,
);
criterion_main!(benches);
