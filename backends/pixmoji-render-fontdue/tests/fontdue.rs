//! fontdue backend against real faces from `testdata/fonts`

use std::path::PathBuf;

use image::RgbaImage;
use pixmoji_core::{Anchor, Canvas, FontMetrics, ShapingOptions, TextOptions};
use pixmoji_render_fontdue::{FontdueFont, ImageCanvas};

fn fixture_font(name: &str, size: f32) -> FontdueFont {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/fonts")
        .join(name);
    let data = std::fs::read(&path).expect("fixture font readable");
    FontdueFont::from_bytes(&data, size).expect("fixture font parses")
}

fn mono(size: f32) -> FontdueFont {
    fixture_font("DejaVuSansMono.ttf", size)
}

fn serif(size: f32) -> FontdueFont {
    fixture_font("DejaVuSerif.ttf", size)
}

fn offset(font: &FontdueFont, text: &str, anchor: &str, stroke: u32) -> (i32, i32) {
    let anchor: Anchor = anchor.parse().unwrap();
    font.stroke_mask_offset(text, &ShapingOptions::default(), anchor, stroke, (0.0, 0.0))
        .expect("fontdue computes ink offsets")
}

fn region(image: &RgbaImage, x0: u32) -> Vec<[u8; 4]> {
    (0..image.height())
        .flat_map(|y| (x0..image.width()).map(move |x| (x, y)))
        .map(|(x, y)| image.get_pixel(x, y).0)
        .collect()
}

#[test]
fn glyphs_of_different_faces_do_not_share_cache_entries() {
    let options = TextOptions::default();
    let (serif, mono) = (serif(40.0), mono(40.0));

    let mut mixed = ImageCanvas::new(200, 60);
    mixed.paint_text((0.0, 0.0), "g", &serif, &options).unwrap();
    mixed.paint_text((100.0, 0.0), "g", &mono, &options).unwrap();

    let mut alone = ImageCanvas::new(200, 60);
    alone.paint_text((100.0, 0.0), "g", &mono, &options).unwrap();

    assert!(region(alone.image(), 100).iter().any(|px| px[3] > 0));
    assert_eq!(region(mixed.image(), 100), region(alone.image(), 100));
}

#[test]
fn resized_face_keeps_its_identity() {
    let font = mono(20.0);
    let bigger = font.with_size(32.0);
    assert_eq!(font.face(), bigger.face());
    assert_ne!(font.face(), mono(20.0).face());
    assert_eq!(bigger.size(), 32.0);

    let debug = format!("{bigger:?}");
    assert!(debug.starts_with("FontdueFont"));
    assert!(debug.contains("size: 32.0"));
}

#[test]
fn monospace_advances_add_up() {
    let font = mono(20.0);
    let shaping = ShapingOptions::default();
    let one = font.advance_width("i", &shaping);
    let four = font.advance_width("iiii", &shaping);

    assert!(one > 0.0);
    assert!((four - 4.0 * one).abs() < 1e-3);
    assert!((font.advance_width("WiW", &shaping) - 3.0 * one).abs() < 1e-3);
    assert_eq!(font.advance_width("", &shaping), 0.0);
}

#[test]
fn line_height_is_the_rounded_ascent() {
    let font = serif(40.0);
    let height = font.line_height();
    assert_eq!(height, height.round());
    assert!(height > 20.0 && height <= 40.0);
    assert_eq!(
        font.multiline_spacing(4.0, 2),
        height + 2.0 + 4.0,
        "default spacing adds stroke and spacing"
    );
}

#[test]
fn horizontal_anchor_moves_ink_by_half_and_full_width() {
    let font = mono(20.0);
    let text = "hello";
    let width = font.advance_width(text, &ShapingOptions::default());

    let left = offset(&font, text, "la", 0);
    let middle = offset(&font, text, "ma", 0);
    let right = offset(&font, text, "ra", 0);

    assert_eq!(left.0, 0);
    assert_eq!(middle.0, (-width / 2.0).floor() as i32);
    assert_eq!(right.0, (-width).floor() as i32);
    assert_eq!(left.1, middle.1);
    assert_eq!(middle.1, right.1);
}

#[test]
fn lower_vertical_anchors_lift_the_ink() {
    let font = serif(30.0);
    let ascender = offset(&font, "Ag", "la", 0);
    let baseline = offset(&font, "Ag", "ls", 0);
    let descender = offset(&font, "Ag", "ld", 0);

    assert!(ascender.1 > baseline.1);
    assert!(baseline.1 > descender.1);
    assert_eq!(ascender.0, baseline.0);
}

#[test]
fn stroke_pushes_the_mask_up_and_left() {
    let font = mono(20.0);
    let plain = offset(&font, "ab", "la", 0);
    let stroked = offset(&font, "ab", "la", 3);
    assert_eq!(stroked, (plain.0 - 3, plain.1 - 3));
}

#[test]
fn stroked_text_covers_more_pixels() {
    let font = mono(24.0);
    let plain = TextOptions::default();
    let stroked = TextOptions {
        stroke_width: 2,
        ..Default::default()
    };

    let inked = |options: &TextOptions| {
        let mut canvas = ImageCanvas::new(80, 40);
        canvas.paint_text((4.0, 4.0), "x", &font, options).unwrap();
        canvas.image().pixels().filter(|px| px[3] > 0).count()
    };

    assert!(inked(&stroked) > inked(&plain));
}
