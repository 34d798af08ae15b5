//! Layout: where every line and every emoji lands
//!
//! Emoji are not laid out on their own. Each resolved emoji is replaced by
//! enough spaces to cover its bitmap, and the resulting line is measured and
//! positioned the way a plain multiline text call would do it. Bitmaps are
//! then dropped into the gaps by walking the line's tokens.
//!
//! Everything here is synchronous and side-effect free: the caller resolves
//! assets first and hands them in as an [`AssetMap`].

use std::collections::HashMap;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use pixmoji_core::types::{AssetKey, Line, PaintOp, Token};
use pixmoji_core::{
    Align, Direction, FontMetrics, HorizontalAnchor, PixmojiError, Result, TextOptions,
    VerticalAnchor,
};

/// Bitmaps that resolved, by asset key
///
/// A token whose key is missing prints as text.
pub type AssetMap = HashMap<AssetKey, Arc<RgbaImage>>;

/// Size and nudge applied to every emoji of one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmojiGeometry {
    pub scale: f32,
    pub offset: (i32, i32),
}

impl Default for EmojiGeometry {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: (0, 0),
        }
    }
}

impl EmojiGeometry {
    /// Pixel width of an emoji for `font`, `None` when it rounds to nothing
    pub fn width<M: FontMetrics + ?Sized>(&self, font: &M) -> Option<u32> {
        let width = (self.scale * font.size()).round_ties_even();
        (width >= 1.0).then_some(width as u32)
    }
}

/// One laid out line
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    /// Printable text, emoji replaced by spaces
    pub text: String,
    /// Width of `text` as the font measures it; anchor and align use this
    pub text_width: f32,
    /// Horizontal advance of each token, node spacing included
    pub advances: Vec<f32>,
    /// Sum of `advances`
    pub width: f32,
    /// Where the line's text is painted
    pub origin: (f32, f32),
}

/// Result of laying out one block of text
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub lines: Vec<LayoutLine>,
    /// Paint operations in the order they must be applied
    pub ops: Vec<PaintOp>,
    /// Widest `text_width` of the block
    pub max_width: f32,
    pub line_spacing: f32,
}

/// Reject anchor and direction combinations plain multiline text refuses
///
/// Runs before any asset is fetched.
pub fn validate(line_count: usize, options: &TextOptions) -> Result<()> {
    if line_count <= 1 {
        return Ok(());
    }
    if options.shaping.direction == Some(Direction::TopToBottom) {
        return Err(PixmojiError::UnsupportedMultilineDirection);
    }
    let anchor = options.effective_anchor();
    if anchor.vertical != VerticalAnchor::Ascender {
        return Err(PixmojiError::UnsupportedMultilineAnchor(anchor.to_string()));
    }
    Ok(())
}

/// The bitmap a token will be drawn with, if any
fn bitmap_for<'a>(token: &Token, assets: &'a AssetMap) -> Option<(AssetKey, &'a Arc<RgbaImage>)> {
    let key = AssetKey::for_token(token)?;
    let bitmap = assets.get(&key)?;
    Some((key, bitmap))
}

struct Substitution {
    text: String,
    advances: Vec<f32>,
}

/// Build a line's printable text and the advance of each of its tokens
fn substitute<M: FontMetrics + ?Sized>(
    line: &Line,
    font: &M,
    options: &TextOptions,
    geometry: EmojiGeometry,
    space_advance: f32,
    assets: &AssetMap,
) -> Substitution {
    let mut text = String::new();
    let mut advances = Vec::with_capacity(line.len());

    for token in line {
        let emoji_width = bitmap_for(token, assets).and(geometry.width(font));

        match emoji_width {
            Some(width) => {
                let reserved = width as f32 + geometry.offset.0 as f32 + 2.0 * options.node_spacing;
                let spaces = if space_advance > 0.0 {
                    (reserved / space_advance).round_ties_even().max(0.0) as usize
                } else {
                    0
                };
                log::trace!(
                    "Reserving {spaces} spaces for {:?} ({width}px)",
                    token.content()
                );
                text.extend(std::iter::repeat(' ').take(spaces));
                advances.push(width as f32 + options.node_spacing);
            },
            None => {
                text.push_str(token.content());
                let advance = font.advance_width(token.content(), &options.shaping).trunc();
                advances.push(advance + options.node_spacing);
            },
        }
    }

    Substitution { text, advances }
}

fn space_advance<M: FontMetrics + ?Sized>(font: &M, options: &TextOptions) -> f32 {
    let advance = font.advance_width(" ", &options.shaping);
    if advance <= 0.0 {
        log::warn!("Font reports a non-positive space advance ({advance}); emoji get no room");
    }
    advance
}

/// Lay out `lines` with the block anchored at `xy`
pub fn layout<M: FontMetrics + ?Sized>(
    lines: &[Line],
    font: &M,
    options: &TextOptions,
    xy: (f32, f32),
    geometry: EmojiGeometry,
    assets: &AssetMap,
) -> Result<LayoutPlan> {
    validate(lines.len(), options)?;

    let anchor = options.effective_anchor();
    let line_spacing = font.multiline_spacing(options.spacing, options.stroke_width);
    let space = space_advance(font, options);

    let mut substituted = Vec::with_capacity(lines.len());
    let mut max_width: f32 = 0.0;
    for line in lines {
        let sub = substitute(line, font, options, geometry, space, assets);
        let text_width = font.advance_width(&sub.text, &options.shaping);
        max_width = max_width.max(text_width);
        substituted.push((sub, text_width));
    }

    let steps = lines.len().saturating_sub(1) as f32;
    let mut y = xy.1;
    match anchor.vertical {
        VerticalAnchor::Middle => y -= steps * line_spacing / 2.0,
        VerticalAnchor::Descender => y -= steps * line_spacing,
        _ => {},
    }

    let mut resized: HashMap<(AssetKey, u32, u32), Arc<RgbaImage>> = HashMap::new();
    let mut ops = Vec::new();
    let mut laid_out = Vec::with_capacity(lines.len());

    for (line, (sub, text_width)) in lines.iter().zip(substituted) {
        let difference = max_width - text_width;
        let mut x = xy.0;

        match anchor.horizontal {
            HorizontalAnchor::Middle => x -= difference / 2.0,
            HorizontalAnchor::Right => x -= difference,
            _ => {},
        }
        match options.align {
            Align::Left => {},
            Align::Center => x += difference / 2.0,
            Align::Right => x += difference,
        }

        if !sub.text.is_empty() {
            ops.push(PaintOp::Text {
                text: sub.text.clone(),
                origin: (x, y),
            });
        }

        // Bitmaps follow the glyph ink, which may sit off the nominal origin
        let (mut cursor, mut paste_y) = (x, y);
        if options.has_visible_fill() && line.has_emoji() && !sub.text.is_empty() {
            // the fill pass of a stroked line is measured without stroke
            let start = (x.fract(), y.fract());
            if let Some((dx, dy)) =
                font.stroke_mask_offset(&sub.text, &options.shaping, anchor, 0, start)
            {
                cursor = (x.trunc() as i64 + dx as i64) as f32;
                paste_y = (y.trunc() as i64 + dy as i64) as f32;
            }
        }

        for (token, advance) in line.iter().zip(&sub.advances) {
            if let (Some((key, bitmap)), Some(width)) =
                (bitmap_for(token, assets), geometry.width(font))
            {
                let height = (bitmap.height() as f64 / bitmap.width() as f64 * width as f64)
                    .ceil()
                    .max(1.0) as u32;
                let size = (width, height);

                let scaled = resized
                    .entry((key, width, height))
                    .or_insert_with(|| {
                        Arc::new(imageops::resize(
                            bitmap.as_ref(),
                            width,
                            height,
                            FilterType::Lanczos3,
                        ))
                    })
                    .clone();

                let origin = (
                    (cursor + geometry.offset.0 as f32).round_ties_even() as i32,
                    (paste_y + geometry.offset.1 as f32).round_ties_even() as i32,
                );
                ops.push(PaintOp::Bitmap {
                    bitmap: scaled,
                    origin,
                    size,
                });
            }
            cursor += advance;
        }

        let width = sub.advances.iter().sum();
        laid_out.push(LayoutLine {
            text: sub.text,
            text_width,
            advances: sub.advances,
            width,
            origin: (x, y),
        });

        y += line_spacing;
    }

    Ok(LayoutPlan {
        lines: laid_out,
        ops,
        max_width,
        line_spacing,
    })
}

/// Size of the block `layout` would paint, as `(width, height)`
///
/// Width is the widest line's token advance sum; height counts one line
/// spacing per line minus the trailing gap.
pub fn measure<M: FontMetrics + ?Sized>(
    lines: &[Line],
    font: &M,
    options: &TextOptions,
    geometry: EmojiGeometry,
    assets: &AssetMap,
) -> (f32, f32) {
    let space = space_advance(font, options);
    let width = lines
        .iter()
        .map(|line| {
            substitute(line, font, options, geometry, space, assets)
                .advances
                .iter()
                .sum::<f32>()
        })
        .fold(0.0_f32, f32::max);

    let line_spacing = font.multiline_spacing(options.spacing, options.stroke_width);
    let height = lines.len() as f32 * line_spacing - options.spacing;
    (width, height.max(0.0))
}
