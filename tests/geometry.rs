//! Placeholder inheritance and shape geometry.

mod common;

use common::{grp, px, sp, DeckBuilder};
use slidekit::units::{emu_to_px, px_to_emu};
use slidekit::{Error, GeometryType, PlaceholderType, ShapeKind};

fn title_deck() -> DeckBuilder {
    DeckBuilder::new()
        .master_shapes(&sp(
            2,
            "Master Title",
            Some(r#"<p:ph type="title"/>"#),
            Some((px(40), px(10), px(880), px(100))),
            None,
        ))
        .layout_shapes(&format!(
            "{}{}",
            sp(
                2,
                "Title 1",
                Some(r#"<p:ph type="title"/>"#),
                Some((px(50), px(20), px(600), px(80))),
                None,
            ),
            sp(
                3,
                "Content Placeholder 2",
                Some(r#"<p:ph idx="1"/>"#),
                Some((px(50), px(120), px(600), px(400))),
                None,
            )
        ))
}

#[test]
fn test_title_inherits_layout_geometry() {
    let pres = title_deck()
        .slide(&sp(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Title 1").unwrap();
    assert_eq!(shape.placeholder().unwrap().placeholder_type, Some(PlaceholderType::Title));
    assert_eq!(shape.x().unwrap(), 50);
    assert_eq!(shape.y().unwrap(), 20);
    assert_eq!(shape.width().unwrap(), 600);
    assert_eq!(shape.height().unwrap(), 80);
    assert_eq!(shape.referenced_shape().unwrap().name(), "Title 1");
}

#[test]
fn test_index_match_wins() {
    let pres = title_deck()
        .slide(&sp(4, "Body", Some(r#"<p:ph type="body" idx="1"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Body").unwrap();
    assert_eq!(shape.y().unwrap(), 120);
    assert_eq!(shape.height().unwrap(), 400);
}

#[test]
fn test_first_matching_candidate_wins() {
    // the untyped placeholder comes first, so it wins over the later index match
    let pres = DeckBuilder::new()
        .layout_shapes(&format!(
            "{}{}",
            sp(2, "Untyped", Some(r#"<p:ph idx="5"/>"#), Some((px(11), 0, px(50), px(50))), None),
            sp(3, "Body", Some(r#"<p:ph type="body" idx="2"/>"#), Some((px(77), 0, px(50), px(50))), None),
        ))
        .slide(&sp(4, "Text", Some(r#"<p:ph type="body" idx="2"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Text").unwrap();
    assert_eq!(shape.referenced_shape().unwrap().name(), "Untyped");
    assert_eq!(shape.x().unwrap(), 11);
}

#[test]
fn test_grouped_layout_placeholder_is_not_a_candidate() {
    let nested = sp(3, "Nested Title", Some(r#"<p:ph type="title"/>"#), Some((px(5), px(5), px(10), px(10))), None);
    let pres = DeckBuilder::new()
        .layout_shapes(&format!(
            "{}{}",
            grp(2, "Group", (0, 0, px(100), px(100)), (0, 0, px(100), px(100)), &nested),
            sp(4, "Title 1", Some(r#"<p:ph type="title"/>"#), Some((px(50), px(20), px(600), px(80))), None),
        ))
        .slide(&sp(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Title 1").unwrap();
    assert_eq!(shape.x().unwrap(), 50);
    assert_eq!(shape.width().unwrap(), 600);
}

#[test]
fn test_layout_geometry_change_reaches_slide() {
    let mut pres = title_deck()
        .slide(&sp(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, None))
        .open();
    let key = pres.find_shape(0, "Title 1").unwrap();
    {
        // warm the cache
        let shape = pres.shape(&key).unwrap();
        assert_eq!((shape.x().unwrap(), shape.width().unwrap()), (50, 600));
    }

    let layout_key = pres.layout(0).unwrap().shape_by_name("Title 1").unwrap().key().clone();
    {
        let mut layout_shape = pres.shape_mut(&layout_key).unwrap();
        layout_shape.set_x(70).unwrap();
        layout_shape.set_width(500).unwrap();
    }

    let shape = pres.shape(&key).unwrap();
    assert_eq!(shape.x().unwrap(), 70);
    assert_eq!(shape.y().unwrap(), 20);
    assert_eq!(shape.width().unwrap(), 500);
}

#[test]
fn test_master_geometry_change_reaches_slide() {
    let mut pres = DeckBuilder::new()
        .master_shapes(&sp(
            5,
            "Footer",
            Some(r#"<p:ph type="ftr" idx="11"/>"#),
            Some((px(300), px(700), px(200), px(30))),
            None,
        ))
        .slide(&sp(7, "Footer 6", Some(r#"<p:ph type="ftr" idx="11"/>"#), None, None))
        .open();
    let key = pres.find_shape(0, "Footer 6").unwrap();
    assert_eq!(pres.shape(&key).unwrap().y().unwrap(), 700);

    let master_key = pres.masters()[0].shape_by_name("Footer").unwrap().key().clone();
    pres.shape_mut(&master_key).unwrap().set_y(650).unwrap();

    assert_eq!(pres.shape(&key).unwrap().y().unwrap(), 650);
}

#[test]
fn test_explicit_component_overrides_inherited() {
    // only the offset is set on the slide; the extent comes from the layout
    let slide = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
        <p:spPr><a:xfrm><a:off x="95250" y="190500"/></a:xfrm></p:spPr></p:sp>"#;
    let pres = title_deck().slide(slide).open();

    let shape = pres.slide(0).unwrap().shape_by_name("Title 1").unwrap();
    assert_eq!((shape.x().unwrap(), shape.y().unwrap()), (10, 20));
    assert_eq!((shape.width().unwrap(), shape.height().unwrap()), (600, 80));
}

#[test]
fn test_layout_placeholder_falls_back_to_master() {
    // the layout has no footer; the slide footer matches the master directly
    let pres = DeckBuilder::new()
        .master_shapes(&sp(
            5,
            "Footer",
            Some(r#"<p:ph type="ftr" idx="11"/>"#),
            Some((px(300), px(700), px(200), px(30))),
            None,
        ))
        .layout_shapes(&sp(
            2,
            "Title 1",
            Some(r#"<p:ph type="title"/>"#),
            Some((0, 0, px(10), px(10))),
            None,
        ))
        .slide(&sp(7, "Footer 6", Some(r#"<p:ph type="ftr" idx="11"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Footer 6").unwrap();
    assert_eq!(shape.y().unwrap(), 700);
    assert_eq!(shape.width().unwrap(), 200);
}

#[test]
fn test_unmatched_placeholder_defaults() {
    let pres = DeckBuilder::new()
        .slide(&sp(2, "Chart Placeholder", Some(r#"<p:ph type="chart" idx="9"/>"#), None, None))
        .open();

    let shape = pres.slide(0).unwrap().shape_by_name("Chart Placeholder").unwrap();
    assert!(shape.referenced_shape().is_none());
    assert_eq!(shape.x().unwrap(), 0);
    assert_eq!(shape.width().unwrap(), 0);
    assert_eq!(shape.height().unwrap(), 0);
    assert_eq!(shape.geometry_type().unwrap(), GeometryType::Rectangle);
}

#[test]
fn test_plain_shape_without_transform() {
    let pres = DeckBuilder::new().slide(&sp(2, "Loose", None, None, None)).open();

    let shape = pres.slide(0).unwrap().shape_by_name("Loose").unwrap();
    assert!(matches!(shape.x(), Err(Error::ResolutionExhausted(_))));
    assert!(matches!(shape.y(), Err(Error::ResolutionExhausted(_))));
    assert_eq!(shape.width().unwrap(), 0);
    assert_eq!(shape.height().unwrap(), 0);
}

#[test]
fn test_set_size_materializes_placeholder_transform() {
    let mut pres = title_deck()
        .slide(&sp(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, None))
        .open();
    let key = pres.find_shape(0, "Title 1").unwrap();

    pres.shape_mut(&key).unwrap().set_width(300).unwrap();

    let shape = pres.shape(&key).unwrap();
    assert_eq!(shape.width().unwrap(), 300);
    assert_eq!(shape.height().unwrap(), 80);
    assert_eq!((shape.x().unwrap(), shape.y().unwrap()), (50, 20));

    // the layout keeps its own geometry
    let layout_shape = pres.layout(0).unwrap().shape_by_name("Title 1").unwrap();
    assert_eq!(layout_shape.width().unwrap(), 600);
}

#[test]
fn test_set_position_and_size() {
    let mut pres = DeckBuilder::new()
        .slide(&sp(2, "Box", None, Some((px(10), px(10), px(100), px(40))), None))
        .open();
    let key = pres.find_shape(0, "Box").unwrap();

    {
        let mut shape = pres.shape_mut(&key).unwrap();
        shape.set_x(200).unwrap();
        shape.set_y(150).unwrap();
        shape.set_height(60).unwrap();
    }

    let shape = pres.shape(&key).unwrap();
    assert_eq!(shape.x().unwrap(), 200);
    assert_eq!(shape.y().unwrap(), 150);
    assert_eq!(shape.width().unwrap(), 100);
    assert_eq!(shape.height().unwrap(), 60);
    assert_eq!(shape.offset_emu().unwrap(), (px(200), px(150)));
}

#[test]
fn test_resize_rejected_inside_group() {
    let child = sp(3, "Child", None, Some((px(50), px(50), px(50), px(50))), None);
    let pres_bytes = DeckBuilder::new()
        .slide(&grp(
            2,
            "Group",
            (px(100), px(100), px(200), px(200)),
            (0, 0, px(200), px(200)),
            &child,
        ))
        .build();
    let mut pres = slidekit::Presentation::from_bytes(pres_bytes).unwrap();
    let child_key = pres.find_shape(0, "Child").unwrap();
    let group_key = pres.find_shape(0, "Group").unwrap();

    let err = pres.shape_mut(&child_key).unwrap().set_width(10).unwrap_err();
    assert!(matches!(err, Error::InvalidMutation(_)));
    let err = pres.shape_mut(&group_key).unwrap().set_height(10).unwrap_err();
    assert!(matches!(err, Error::InvalidMutation(_)));

    // nothing was written
    assert_eq!(pres.shape(&child_key).unwrap().width().unwrap(), 50);
    assert_eq!(pres.shape(&group_key).unwrap().width().unwrap(), 200);
}

#[test]
fn test_grouped_shape_reports_slide_position() {
    let child = sp(3, "Child", None, Some((px(50), px(50), px(50), px(50))), None);
    let pres = DeckBuilder::new()
        .slide(&grp(
            2,
            "Group",
            (px(100), px(100), px(200), px(200)),
            (0, 0, px(200), px(200)),
            &child,
        ))
        .open();

    let slide = pres.slide(0).unwrap();
    let group = slide.shape_by_name("Group").unwrap();
    assert_eq!(group.kind(), ShapeKind::Group);
    assert_eq!(group.shapes().len(), 1);

    let child = slide.shape_by_name("Child").unwrap();
    assert_eq!((child.x().unwrap(), child.y().unwrap()), (150, 150));
    assert_eq!(child.parent_group().unwrap().name(), "Group");
    assert_eq!(slide.shapes().len(), 1);
    assert_eq!(slide.all_shapes().len(), 2);
}

#[test]
fn test_pixel_round_trip() {
    for emu in [0, 1, 4762, 4763, 9525, 123_456, 914_400, 6_858_000] {
        let pixel = emu_to_px(emu, 96.0);
        let back = px_to_emu(pixel, 96.0);
        assert_eq!(emu_to_px(back, 96.0), pixel);
    }
}

#[test]
fn test_dpi_option() {
    let pres = DeckBuilder::new()
        .slide(&sp(2, "Box", None, Some((914_400, 0, 914_400, 457_200)), None))
        .open_with(slidekit::PresentationOptions::new().with_dpi(72.0));

    let shape = pres.slide(0).unwrap().shape_by_name("Box").unwrap();
    assert_eq!(shape.x().unwrap(), 72);
    assert_eq!(shape.height().unwrap(), 36);
    assert_eq!(pres.slide_width(), 720);
}
