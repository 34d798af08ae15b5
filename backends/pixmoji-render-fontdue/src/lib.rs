//! fontdue backend - measurement and painting without system dependencies
//!
//! [`FontdueFont`] answers the layout engine's measurement questions and
//! [`ImageCanvas`] paints onto an [`RgbaImage`]. Glyphs are laid out one
//! after another with pair kerning; no complex shaping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fontdue::{Font, FontSettings, Metrics};
use image::{imageops, Rgba, RgbaImage};
use pixmoji_core::{
    Anchor, Canvas, Color, FontMetrics, HorizontalAnchor, RenderError, Result, ShapingOptions,
    TextOptions, VerticalAnchor,
};

/// Identity of a parsed face, shared by every size derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(u64);

impl FaceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A parsed font at a fixed pixel size
#[derive(Clone)]
pub struct FontdueFont {
    font: Arc<Font>,
    face: FaceId,
    size: f32,
}

impl std::fmt::Debug for FontdueFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueFont")
            .field("face", &self.face)
            .field("size", &self.size)
            .finish()
    }
}

impl FontdueFont {
    pub fn from_bytes(data: &[u8], size: f32) -> Result<Self> {
        let font = Font::from_bytes(
            data,
            FontSettings {
                scale: size,
                ..FontSettings::default()
            },
        )
        .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self::new(font, size))
    }

    pub fn new(font: Font, size: f32) -> Self {
        Self {
            font: Arc::new(font),
            face: FaceId::next(),
            size,
        }
    }

    /// Same face at another size
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            font: Arc::clone(&self.font),
            face: self.face,
            size,
        }
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn face(&self) -> FaceId {
        self.face
    }

    /// Ascent above and descent below the baseline, both positive
    fn vertical_metrics(&self) -> (f32, f32) {
        match self.font.horizontal_line_metrics(self.size) {
            Some(metrics) => (metrics.ascent, -metrics.descent),
            None => (self.size * 0.8, self.size * 0.2),
        }
    }

    /// Pen position of every character plus the total advance
    fn pen_positions(&self, text: &str) -> (Vec<(char, f32)>, f32) {
        let mut positions = Vec::with_capacity(text.len());
        let mut pen = 0.0;
        let mut previous = None;

        for ch in text.chars() {
            if let Some(prev) = previous {
                pen += self.font.horizontal_kern(prev, ch, self.size).unwrap_or(0.0);
            }
            positions.push((ch, pen));
            pen += self.font.metrics(ch, self.size).advance_width;
            previous = Some(ch);
        }

        (positions, pen)
    }

    /// Top and bottom of the inked area, measured down from the ascender
    fn ink_extent(&self, text: &str) -> Option<(f32, f32)> {
        let (ascent, _) = self.vertical_metrics();
        text.chars()
            .map(|ch| self.font.metrics(ch, self.size))
            .filter(|m| m.width > 0 && m.height > 0)
            .map(|m| {
                let top = ascent - (m.ymin as f32 + m.height as f32);
                let bottom = ascent - m.ymin as f32;
                (top, bottom)
            })
            .reduce(|(t1, b1), (t2, b2)| (t1.min(t2), b1.max(b2)))
    }

    /// Distance from the anchor point to the top-left of the line box
    fn anchor_shift(&self, text: &str, anchor: Anchor) -> (f32, f32) {
        let (_, width) = self.pen_positions(text);
        let (ascent, descent) = self.vertical_metrics();
        let (ink_top, ink_bottom) = self.ink_extent(text).unwrap_or((0.0, ascent));

        let dx = match anchor.horizontal {
            HorizontalAnchor::Left | HorizontalAnchor::Start => 0.0,
            HorizontalAnchor::Middle => width / 2.0,
            HorizontalAnchor::Right => width,
        };
        let dy = match anchor.vertical {
            VerticalAnchor::Ascender => 0.0,
            VerticalAnchor::Top => ink_top,
            VerticalAnchor::Middle => (ascent + descent) / 2.0,
            VerticalAnchor::Baseline => ascent,
            VerticalAnchor::Bottom => ink_bottom,
            VerticalAnchor::Descender => ascent + descent,
        };
        (dx, dy)
    }
}

impl FontMetrics for FontdueFont {
    fn size(&self) -> f32 {
        self.size
    }

    fn advance_width(&self, text: &str, _shaping: &ShapingOptions) -> f32 {
        self.pen_positions(text).1
    }

    /// Bottom of a capital `A`, which sits on the baseline
    fn line_height(&self) -> f32 {
        self.vertical_metrics().0.round()
    }

    fn stroke_mask_offset(
        &self,
        text: &str,
        _shaping: &ShapingOptions,
        anchor: Anchor,
        stroke_width: u32,
        start: (f32, f32),
    ) -> Option<(i32, i32)> {
        let (dx, dy) = self.anchor_shift(text, anchor);
        let ink_top = self.ink_extent(text).map_or(0.0, |(top, _)| top);
        let stroke = stroke_width as f32;

        Some((
            (start.0 - dx - stroke).floor() as i32,
            (start.1 - dy + ink_top - stroke).floor() as i32,
        ))
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: u8) {
    let sa = color.a as f32 / 255.0 * coverage as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let src = [color.r, color.g, color.b];

    for (channel, &s) in src.iter().enumerate() {
        let mixed = (s as f32 * sa + dst[channel] as f32 * da * (1.0 - sa)) / out_a;
        dst[channel] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Face, character and size bits of a rasterized glyph
type GlyphKey = (FaceId, char, u32);

/// Paints onto an owned RGBA image
pub struct ImageCanvas {
    image: RgbaImage,
    glyphs: HashMap<GlyphKey, (Metrics, Vec<u8>)>,
}

impl ImageCanvas {
    /// Transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, color.into()))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            glyphs: HashMap::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn draw_glyphs(
        &mut self,
        font: &FontdueFont,
        pens: &[(char, f32)],
        origin: (f32, f32),
        color: Color,
        spread: i32,
    ) {
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);

        for &(ch, pen) in pens {
            let (metrics, coverage) = self
                .glyphs
                .entry((font.face, ch, font.size.to_bits()))
                .or_insert_with(|| font.font.rasterize(ch, font.size));

            let left = (origin.0 + pen).round() as i64 + metrics.xmin as i64;
            let top = origin.1.round() as i64 - (metrics.ymin as i64 + metrics.height as i64);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let value = coverage[gy * metrics.width + gx];
                    if value == 0 {
                        continue;
                    }
                    for oy in -spread..=spread {
                        for ox in -spread..=spread {
                            let x = left + gx as i64 + ox as i64;
                            let y = top + gy as i64 + oy as i64;
                            if x < 0 || y < 0 || x >= width || y >= height {
                                continue;
                            }
                            blend(self.image.get_pixel_mut(x as u32, y as u32), color, value);
                        }
                    }
                }
            }
        }
    }
}

impl Canvas for ImageCanvas {
    type Font = FontdueFont;

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn paint_text(
        &mut self,
        origin: (f32, f32),
        text: &str,
        font: &FontdueFont,
        options: &TextOptions,
    ) -> Result<()> {
        let (dx, dy) = font.anchor_shift(text, options.effective_anchor());
        let (ascent, _) = font.vertical_metrics();
        let baseline = (origin.0 - dx, origin.1 - dy + ascent);
        let (pens, _) = font.pen_positions(text);
        let fill = options.fill.unwrap_or_else(Color::black);

        log::trace!("fontdue: painting {} glyphs at {:?}", pens.len(), baseline);

        if options.stroke_width > 0 {
            let stroke = options.stroke_fill.unwrap_or(fill);
            self.draw_glyphs(font, &pens, baseline, stroke, options.stroke_width as i32);
        }
        self.draw_glyphs(font, &pens, baseline, fill, 0);
        Ok(())
    }

    fn paste_bitmap(&mut self, origin: (i32, i32), bitmap: &RgbaImage) -> Result<()> {
        imageops::overlay(&mut self.image, bitmap, origin.0 as i64, origin.1 as i64);
        Ok(())
    }

    fn clear_cache(&mut self) {
        log::debug!("fontdue: dropping {} rasterized glyphs", self.glyphs.len());
        self.glyphs.clear();
    }
}
