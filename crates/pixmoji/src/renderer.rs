//! The renderer: owns the canvas, resolves emoji, paints
//!
//! [`Renderer`] and [`AsyncRenderer`] share everything except how assets
//! are fetched. Tokenizing, validation, layout and painting live in
//! `RendererCore`; each flavour only fills the [`AssetMap`] in between.
//!
//! All assets of a call are resolved before the first paint operation, so a
//! call that fails or is abandoned while fetching leaves the canvas as it
//! was.

use pixmoji_core::types::{AssetKey, Line, PaintOp, ResolvedAsset, Token, TokenKind};
use pixmoji_core::{AsyncFetch, Canvas, Fetch, PixmojiError, RendererConfig, Result, TextOptions};
use pixmoji_source::{AssetSource, AsyncAssetSource, ProviderConfig};
use pixmoji_unicode::Tokenizer;

use crate::layout::{self, AssetMap, EmojiGeometry, LayoutPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Closed,
}

/// State and logic shared by both renderer flavours
pub(crate) struct RendererCore<C: Canvas> {
    canvas: C,
    config: RendererConfig,
    tokenizer: &'static Tokenizer,
    lifecycle: Lifecycle,
}

impl<C: Canvas> RendererCore<C> {
    fn new(canvas: C, config: RendererConfig) -> Result<Self> {
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(PixmojiError::InvalidCanvas { width, height });
        }
        config.validate()?;

        Ok(Self {
            canvas,
            config,
            tokenizer: Tokenizer::global(),
            lifecycle: Lifecycle::Open,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    fn ensure_open(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Open => Ok(()),
            Lifecycle::Closed => Err(PixmojiError::Closed),
        }
    }

    /// Renderer defaults with the call's overrides applied
    fn geometry(&self, options: &TextOptions) -> Result<EmojiGeometry> {
        let geometry = EmojiGeometry {
            scale: options
                .emoji_scale_factor
                .unwrap_or(self.config.emoji_scale_factor),
            offset: options
                .emoji_position_offset
                .unwrap_or(self.config.emoji_position_offset),
        };
        if !geometry.scale.is_finite() || geometry.scale <= 0.0 {
            return Err(PixmojiError::Config(format!(
                "emoji_scale_factor must be a positive number, got {}",
                geometry.scale
            )));
        }
        Ok(geometry)
    }

    /// Tokenize and check everything that can be checked without fetching
    fn prepare(&self, text: &str, options: &TextOptions) -> Result<(Vec<Line>, EmojiGeometry)> {
        self.ensure_open()?;
        let geometry = self.geometry(options)?;
        let lines = self.tokenizer.tokenize(text);
        layout::validate(lines.len(), options)?;
        Ok((lines, geometry))
    }

    /// Like [`Self::prepare`], minus the multiline anchor checks `measure` does not need
    fn prepare_measure(
        &self,
        text: &str,
        options: &TextOptions,
    ) -> Result<(Vec<Line>, EmojiGeometry)> {
        self.ensure_open()?;
        let geometry = self.geometry(options)?;
        Ok((self.tokenizer.tokenize(text), geometry))
    }

    /// Emoji tokens that need a lookup, one per asset key
    fn wanted<'l>(&self, lines: &'l [Line]) -> Vec<&'l Token> {
        let mut seen = std::collections::HashSet::new();
        lines
            .iter()
            .flat_map(|line| line.iter())
            .filter(|token| match token.kind() {
                TokenKind::Text => false,
                TokenKind::UnicodeEmoji => true,
                TokenKind::CustomEmoji => self.config.render_custom_emoji,
            })
            .filter(|token| AssetKey::for_token(token).is_some_and(|key| seen.insert(key)))
            .collect()
    }

    fn paint(&mut self, plan: LayoutPlan, font: &C::Font, options: &TextOptions) -> Result<()> {
        log::debug!(
            "Painting {} lines, {} operations",
            plan.lines.len(),
            plan.ops.len()
        );
        for op in plan.ops {
            match op {
                PaintOp::Text { text, origin } => {
                    self.canvas.paint_text(origin, &text, font, options)?;
                },
                PaintOp::Bitmap { bitmap, origin, .. } => {
                    self.canvas.paste_bitmap(origin, &bitmap)?;
                },
            }
        }
        Ok(())
    }

    fn draw(
        &mut self,
        xy: (f32, f32),
        lines: &[Line],
        font: &C::Font,
        options: &TextOptions,
        geometry: EmojiGeometry,
        assets: &AssetMap,
    ) -> Result<()> {
        let plan = layout::layout(lines, font, options, xy, geometry, assets)?;
        self.paint(plan, font, options)
    }

    fn mark_closed(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(PixmojiError::AlreadyClosed);
        }
        self.canvas.clear_cache();
        self.lifecycle = Lifecycle::Closed;
        Ok(())
    }

    fn ensure_closed(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Open => Err(PixmojiError::AlreadyOpen),
            Lifecycle::Closed => Ok(()),
        }
    }
}

fn collect_assets<'t>(
    tokens: impl IntoIterator<Item = &'t Token>,
    resolved: Vec<ResolvedAsset>,
) -> AssetMap {
    tokens
        .into_iter()
        .zip(resolved)
        .filter_map(|(token, asset)| Some((AssetKey::for_token(token)?, asset.bitmap?)))
        .collect()
}

/// Blocking renderer
///
/// ```ignore
/// let mut renderer = Renderer::builder()
///     .canvas(ImageCanvas::new(400, 80))
///     .fetcher(HttpFetcher::new()?)
///     .build()?;
/// renderer.draw_text((10.0, 10.0), "Hello 👋", &font, &TextOptions::default())?;
/// ```
pub struct Renderer<C: Canvas, F: Fetch> {
    core: RendererCore<C>,
    source: AssetSource<F>,
}

impl<C: Canvas, F: Fetch> Renderer<C, F> {
    pub fn builder() -> RendererBuilder<C, F> {
        RendererBuilder::new()
    }

    pub fn new(canvas: C, source: AssetSource<F>, config: RendererConfig) -> Result<Self> {
        let core = RendererCore::new(canvas, config)?;
        let mut source = source;
        source.set_caching(core.config.cache);
        log::info!("Renderer opened with {}", source.fetcher().name());
        Ok(Self { core, source })
    }

    pub fn config(&self) -> &RendererConfig {
        self.core.config()
    }

    pub fn canvas(&self) -> &C {
        self.core.canvas()
    }

    pub fn source(&self) -> &AssetSource<F> {
        &self.source
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    fn resolve(&self, lines: &[Line]) -> AssetMap {
        let wanted = self.core.wanted(lines);
        let resolved = self.source.resolve_all(wanted.iter().copied());
        collect_assets(wanted, resolved)
    }

    /// Draw `text` with the block anchored at `xy`
    pub fn draw_text(
        &mut self,
        xy: (f32, f32),
        text: &str,
        font: &C::Font,
        options: &TextOptions,
    ) -> Result<()> {
        let (lines, geometry) = self.core.prepare(text, options)?;
        let assets = self.resolve(&lines);
        self.core.draw(xy, &lines, font, options, geometry, &assets)
    }

    /// Width and height `draw_text` would cover for the same input
    pub fn measure(&self, text: &str, font: &C::Font, options: &TextOptions) -> Result<(f32, f32)> {
        let (lines, geometry) = self.core.prepare_measure(text, options)?;
        let assets = self.resolve(&lines);
        Ok(layout::measure(&lines, font, options, geometry, &assets))
    }

    /// Lay out without painting
    pub fn plan(
        &self,
        xy: (f32, f32),
        text: &str,
        font: &C::Font,
        options: &TextOptions,
    ) -> Result<LayoutPlan> {
        let (lines, geometry) = self.core.prepare(text, options)?;
        let assets = self.resolve(&lines);
        layout::layout(&lines, font, options, xy, geometry, &assets)
    }

    /// Drop cached assets and the network session
    pub fn close(&mut self) -> Result<()> {
        self.core.mark_closed()?;
        self.source.close();
        log::info!("Renderer closed");
        Ok(())
    }

    /// Bring a closed renderer back
    pub fn open(&mut self) -> Result<()> {
        self.core.ensure_closed()?;
        self.source.reopen()?;
        self.core.lifecycle = Lifecycle::Open;
        log::info!("Renderer reopened");
        Ok(())
    }

    /// Give the canvas back, releasing everything else
    pub fn into_canvas(self) -> C {
        self.core.canvas
    }
}

/// Non-blocking renderer
///
/// Emoji of one call are fetched concurrently; painting happens once every
/// lookup has settled.
pub struct AsyncRenderer<C: Canvas, F: AsyncFetch> {
    core: RendererCore<C>,
    source: AsyncAssetSource<F>,
}

impl<C: Canvas, F: AsyncFetch> AsyncRenderer<C, F> {
    pub async fn new(canvas: C, source: AsyncAssetSource<F>, config: RendererConfig) -> Result<Self> {
        let core = RendererCore::new(canvas, config)?;
        let mut source = source;
        source.set_caching(core.config.cache).await;
        log::info!("Async renderer opened with {}", source.fetcher().name());
        Ok(Self { core, source })
    }

    pub fn config(&self) -> &RendererConfig {
        self.core.config()
    }

    pub fn canvas(&self) -> &C {
        self.core.canvas()
    }

    pub fn source(&self) -> &AsyncAssetSource<F> {
        &self.source
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    async fn resolve(&self, lines: &[Line]) -> AssetMap {
        let wanted = self.core.wanted(lines);
        let resolved = self.source.resolve_all(wanted.iter().copied()).await;
        collect_assets(wanted, resolved)
    }

    pub async fn draw_text(
        &mut self,
        xy: (f32, f32),
        text: &str,
        font: &C::Font,
        options: &TextOptions,
    ) -> Result<()> {
        let (lines, geometry) = self.core.prepare(text, options)?;
        let assets = self.resolve(&lines).await;
        self.core.draw(xy, &lines, font, options, geometry, &assets)
    }

    pub async fn measure(
        &self,
        text: &str,
        font: &C::Font,
        options: &TextOptions,
    ) -> Result<(f32, f32)> {
        let (lines, geometry) = self.core.prepare_measure(text, options)?;
        let assets = self.resolve(&lines).await;
        Ok(layout::measure(&lines, font, options, geometry, &assets))
    }

    /// Lay out without painting
    pub async fn plan(
        &self,
        xy: (f32, f32),
        text: &str,
        font: &C::Font,
        options: &TextOptions,
    ) -> Result<LayoutPlan> {
        let (lines, geometry) = self.core.prepare(text, options)?;
        let assets = self.resolve(&lines).await;
        layout::layout(&lines, font, options, xy, geometry, &assets)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.core.mark_closed()?;
        self.source.close().await;
        log::info!("Async renderer closed");
        Ok(())
    }

    pub fn open(&mut self) -> Result<()> {
        self.core.ensure_closed()?;
        self.source.reopen()?;
        self.core.lifecycle = Lifecycle::Open;
        log::info!("Async renderer reopened");
        Ok(())
    }

    pub fn into_canvas(self) -> C {
        self.core.canvas
    }
}

/// Assembles a renderer from its parts
pub struct RendererBuilder<C, F> {
    canvas: Option<C>,
    fetcher: Option<F>,
    provider: ProviderConfig,
    config: RendererConfig,
}

impl<C, F> RendererBuilder<C, F> {
    pub fn new() -> Self {
        Self {
            canvas: None,
            fetcher: None,
            provider: ProviderConfig::default(),
            config: RendererConfig::default(),
        }
    }

    /// The image to paint on
    pub fn canvas(mut self, canvas: C) -> Self {
        self.canvas = Some(canvas);
        self
    }

    /// Who downloads emoji images
    pub fn fetcher(mut self, fetcher: F) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Where emoji images come from (default: emoji CDN, Twitter style)
    pub fn provider(mut self, provider: impl Into<ProviderConfig>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep fetched emoji for the renderer's lifetime (default: enabled)
    pub fn cache(mut self, enabled: bool) -> Self {
        self.config.cache = enabled;
        self
    }

    /// Resolve custom emoji tags (default: enabled)
    pub fn render_custom_emoji(mut self, enabled: bool) -> Self {
        self.config.render_custom_emoji = enabled;
        self
    }

    pub fn emoji_scale_factor(mut self, scale: f32) -> Self {
        self.config.emoji_scale_factor = scale;
        self
    }

    pub fn emoji_position_offset(mut self, offset: (i32, i32)) -> Self {
        self.config.emoji_position_offset = offset;
        self
    }

    fn parts(self) -> Result<(C, F, ProviderConfig, RendererConfig)> {
        let canvas = self
            .canvas
            .ok_or_else(|| PixmojiError::Config("No canvas configured".into()))?;
        let fetcher = self
            .fetcher
            .ok_or_else(|| PixmojiError::Config("No fetcher configured".into()))?;
        Ok((canvas, fetcher, self.provider, self.config))
    }
}

impl<C: Canvas, F: Fetch> RendererBuilder<C, F> {
    pub fn build(self) -> Result<Renderer<C, F>> {
        let (canvas, fetcher, provider, config) = self.parts()?;
        Renderer::new(canvas, AssetSource::new(fetcher, provider), config)
    }
}

impl<C: Canvas, F: AsyncFetch> RendererBuilder<C, F> {
    pub async fn build_async(self) -> Result<AsyncRenderer<C, F>> {
        let (canvas, fetcher, provider, config) = self.parts()?;
        AsyncRenderer::new(canvas, AsyncAssetSource::new(fetcher, provider), config).await
    }
}

impl<C, F> Default for RendererBuilder<C, F> {
    fn default() -> Self {
        Self::new()
    }
}
