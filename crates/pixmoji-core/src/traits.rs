//! The collaborators the engine talks to
//!
//! Glyph measurement, canvas painting and network access all live outside
//! the engine. These traits fix their contracts so any backend can plug in.
//!
//! - [`FontMetrics`] - advance widths, line height, stroke-aware ink offsets
//! - [`Canvas`] - paints whole lines of text and pastes bitmaps
//! - [`Fetch`] - blocking URL fetch
//! - [`AsyncFetch`] - suspendable URL fetch

use std::future::Future;

use image::RgbaImage;

use crate::error::{FetchError, Result};
use crate::options::{Anchor, ShapingOptions, TextOptions};

/// Measurements the layout engine asks of a font
///
/// ```ignore
/// struct Monospace;
///
/// impl FontMetrics for Monospace {
///     fn size(&self) -> f32 { 20.0 }
///     fn advance_width(&self, text: &str, _: &ShapingOptions) -> f32 {
///         text.chars().count() as f32 * 10.0
///     }
///     fn line_height(&self) -> f32 { 20.0 }
/// }
/// ```
pub trait FontMetrics {
    /// Nominal font size in pixels
    fn size(&self) -> f32;

    /// Horizontal advance of a run of text
    fn advance_width(&self, text: &str, shaping: &ShapingOptions) -> f32;

    /// Height of one line without any extra spacing
    fn line_height(&self) -> f32;

    /// Vertical step between consecutive lines of a multiline block
    fn multiline_spacing(&self, spacing: f32, stroke_width: u32) -> f32 {
        self.line_height() + stroke_width as f32 + spacing
    }

    /// Offset from the nominal origin to where the ink of `text` starts
    ///
    /// `start` carries the fractional part of the origin. Returns `None` when
    /// the backend cannot compute ink offsets.
    fn stroke_mask_offset(
        &self,
        _text: &str,
        _shaping: &ShapingOptions,
        _anchor: Anchor,
        _stroke_width: u32,
        _start: (f32, f32),
    ) -> Option<(i32, i32)> {
        None
    }
}

/// The image being painted on
pub trait Canvas {
    /// Font type the canvas knows how to rasterize
    type Font: FontMetrics;

    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Paint one full line of text at `origin`
    fn paint_text(
        &mut self,
        origin: (f32, f32),
        text: &str,
        font: &Self::Font,
        options: &TextOptions,
    ) -> Result<()>;

    /// Composite `bitmap` at `origin`, using its own alpha as mask
    fn paste_bitmap(&mut self, origin: (i32, i32), bitmap: &RgbaImage) -> Result<()>;

    /// Drop any per-surface state such as rasterized glyphs
    fn clear_cache(&mut self) {}
}

/// What a fetch brings back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking network access
pub trait Fetch: Send + Sync {
    /// Who are you? Used in logs
    fn name(&self) -> &'static str;

    /// GET `url`, blocking the calling thread
    fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, FetchError>;

    /// Release the underlying session
    fn close(&mut self) {}

    /// Recreate a session released by [`Fetch::close`]
    fn reopen(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Suspendable network access
pub trait AsyncFetch: Send + Sync {
    fn name(&self) -> &'static str;

    /// GET `url` without blocking a worker thread
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<FetchResponse, FetchError>> + Send;

    fn close(&mut self) {}

    fn reopen(&mut self) -> Result<()> {
        Ok(())
    }
}
