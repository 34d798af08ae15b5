//! Layout driven by the fontdue backend instead of a fixed-advance stub

use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use pixmoji::layout::{layout, AssetMap, EmojiGeometry, LayoutPlan};
use pixmoji::types::{AssetKey, Line, PaintOp, Token};
use pixmoji::{Anchor, FontMetrics, ShapingOptions, TextOptions};
use pixmoji_render_fontdue::FontdueFont;

fn mono(size: f32) -> FontdueFont {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/fonts/DejaVuSansMono.ttf");
    let data = std::fs::read(&path).expect("fixture font readable");
    FontdueFont::from_bytes(&data, size).expect("fixture font parses")
}

fn assets() -> AssetMap {
    let mut assets = AssetMap::new();
    assets.insert(
        AssetKey::unicode("😀"),
        Arc::new(RgbaImage::from_pixel(72, 72, Rgba([255, 200, 0, 255]))),
    );
    assets
}

fn plan_with(font: &FontdueFont, anchor: &str) -> LayoutPlan {
    let line = Line::new(vec![Token::text("ab"), Token::unicode_emoji("😀")]);
    let options = TextOptions {
        anchor: Some(anchor.parse().unwrap()),
        ..Default::default()
    };
    layout(
        &[line],
        font,
        &options,
        (200.0, 50.0),
        EmojiGeometry::default(),
        &assets(),
    )
    .unwrap()
}

fn bitmap_origin(plan: &LayoutPlan) -> (i32, i32) {
    plan.ops
        .iter()
        .find_map(|op| match op {
            PaintOp::Bitmap { origin, .. } => Some(*origin),
            PaintOp::Text { .. } => None,
        })
        .expect("emoji was placed")
}

#[test]
fn bitmap_follows_the_ink_of_a_middle_anchored_line() {
    let font = mono(20.0);
    let shaping = ShapingOptions::default();
    let plan = plan_with(&font, "ma");
    let line = &plan.lines[0];

    let anchor: Anchor = "ma".parse().unwrap();
    let (ink_x, ink_y) = font
        .stroke_mask_offset(&line.text, &shaping, anchor, 0, (0.0, 0.0))
        .unwrap();
    assert_eq!(ink_x, (-line.text_width / 2.0).floor() as i32);

    let text_advance = font.advance_width("ab", &shaping).trunc() as i32;
    assert_eq!(bitmap_origin(&plan), (200 + ink_x + text_advance, 50 + ink_y));
}

#[test]
fn anchors_shift_bitmaps_with_the_text() {
    let font = mono(20.0);
    let left = plan_with(&font, "la");
    let middle = plan_with(&font, "ma");
    let right = plan_with(&font, "ra");
    let width = left.lines[0].text_width;

    let (lx, ly) = bitmap_origin(&left);
    let (mx, my) = bitmap_origin(&middle);
    let (rx, ry) = bitmap_origin(&right);

    assert_eq!(mx - lx, (-width / 2.0).floor() as i32);
    assert_eq!(rx - lx, (-width).floor() as i32);
    assert_eq!((ly, my), (ry, ry));
}

#[test]
fn emoji_reserve_whole_spaces_of_the_real_font() {
    let font = mono(20.0);
    let plan = plan_with(&font, "la");
    let line = &plan.lines[0];

    let space = font.advance_width(" ", &ShapingOptions::default());
    let spaces = (20.0 / space).round_ties_even() as usize;
    assert_eq!(line.text, format!("ab{}", " ".repeat(spaces)));
    assert_eq!(line.advances[1], 20.0);
}
