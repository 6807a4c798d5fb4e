//! Property tests for unit conversion, group containment and autofit.

mod common;

use common::{body, grp, px, sp, DeckBuilder};
use proptest::prelude::*;
use slidekit::units::{emu_to_px, px_to_emu};
use slidekit::{Presentation, PresentationOptions, ShapeKey};

fn grouped_child(child_x: i64, child_y: i64) -> DeckBuilder {
    let child = sp(3, "Child", None, Some((px(child_x), px(child_y), px(50), px(50))), None);
    DeckBuilder::new().slide(&grp(
        2,
        "Group",
        (px(100), px(100), px(200), px(200)),
        (0, 0, px(200), px(200)),
        &child,
    ))
}

fn bounds(pres: &Presentation, key: &ShapeKey) -> (i64, i64, i64, i64) {
    let shape = pres.shape(key).unwrap();
    let (x, y) = (shape.x().unwrap(), shape.y().unwrap());
    (x, y, x + shape.width().unwrap(), y + shape.height().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_pixel_round_trip(emu in -20_000_000i64..20_000_000, dpi in prop::sample::select(vec![72.0, 96.0, 120.0, 144.0])) {
        let pixel = emu_to_px(emu, dpi);
        prop_assert_eq!(emu_to_px(px_to_emu(pixel, dpi), dpi), pixel);
    }

    #[test]
    fn test_group_contains_moved_child(
        child_x in 0i64..150,
        child_y in 0i64..150,
        new_x in -400i64..800,
        new_y in -400i64..800,
    ) {
        let mut pres = grouped_child(child_x, child_y)
            .open_with(PresentationOptions::new().with_symmetric_vertical_growth(true));
        let child = pres.find_shape(0, "Child").unwrap();
        let group = pres.find_shape(0, "Group").unwrap();

        {
            let mut shape = pres.shape_mut(&child).unwrap();
            shape.set_x(new_x).unwrap();
            shape.set_y(new_y).unwrap();
        }

        let (cl, ct, cr, cb) = bounds(&pres, &child);
        let (gl, gt, gr, gb) = bounds(&pres, &group);
        prop_assert_eq!((cl, ct), (new_x, new_y));
        prop_assert!(gl <= cl && cr <= gr, "x: group {}..{} child {}..{}", gl, gr, cl, cr);
        prop_assert!(gt <= ct && cb <= gb, "y: group {}..{} child {}..{}", gt, gb, ct, cb);
    }

    #[test]
    fn test_set_text_reads_back(lines in prop::collection::vec("[a-zA-Z0-9,.!?]{0,12}", 1..5)) {
        let mut pres = DeckBuilder::new()
            .slide(&sp(2, "TextBox 1", None, Some((0, 0, px(300), px(100))), Some(&body("<a:bodyPr/>", "", &["x"]))))
            .open();
        let key = pres.find_shape(0, "TextBox 1").unwrap();
        let text = lines.join("\n");

        pres.shape_mut(&key).unwrap().text_frame_mut().unwrap().set_text(&text).unwrap();

        let shape = pres.shape(&key).unwrap();
        let frame = shape.text_frame().unwrap();
        prop_assert_eq!(frame.paragraph_count(), lines.len());
        prop_assert_eq!(frame.text(), text);
    }

    #[test]
    fn test_shrink_stays_in_range(
        width in 20i64..400,
        height in 20i64..200,
        hundredths in 600u32..7200,
        words in 1usize..30,
    ) {
        let rpr = format!(r#"<a:rPr sz="{}"/>"#, hundredths);
        let mut pres = DeckBuilder::new()
            .slide(&sp(
                2,
                "TextBox 1",
                None,
                Some((0, 0, px(width), px(height))),
                Some(&body("<a:bodyPr><a:normAutofit/></a:bodyPr>", &rpr, &["x"])),
            ))
            .open();
        let key = pres.find_shape(0, "TextBox 1").unwrap();
        let text = vec!["word"; words].join(" ");

        pres.shape_mut(&key).unwrap().text_frame_mut().unwrap().set_text(&text).unwrap();

        let shape = pres.shape(&key).unwrap();
        let size = shape.text_frame().unwrap().paragraph(0).unwrap().portion(0).unwrap().font().size().unwrap();
        let original = f64::from(hundredths) / 100.0;
        prop_assert!(size >= 5.0, "size {}", size);
        prop_assert!(size <= original.max(5.0), "size {} from {}", size, original);
        prop_assert_eq!(shape.width().unwrap(), width);
        prop_assert_eq!(shape.height().unwrap(), height);
    }
}
