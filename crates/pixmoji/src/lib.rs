//! Pixmoji: text rendering with inline emoji bitmaps
//!
//! Draw text onto an image the way a plain multiline text call would, with
//! every recognized emoji (Unicode sequences and `<:name:id>` custom tags)
//! swapped for a bitmap from an emoji CDN.
//!
//! ## Pieces
//!
//! - [`pixmoji_unicode`] splits text into lines of tokens
//! - [`pixmoji_source`] turns emoji tokens into bitmaps, with caching
//! - [`layout`] computes where text and bitmaps go
//! - [`Renderer`] / [`AsyncRenderer`] tie it together over a [`Canvas`]
//!
//! ```ignore
//! use pixmoji::prelude::*;
//!
//! let mut renderer = Renderer::builder()
//!     .canvas(canvas)
//!     .fetcher(HttpFetcher::new()?)
//!     .provider(EmojiStyle::Apple)
//!     .build()?;
//!
//! renderer.draw_text((10.0, 10.0), "Hello 👋\nBye <:wave:123456789012345678>", &font, &TextOptions::default())?;
//! renderer.close()?;
//! ```

pub mod layout;
mod renderer;

pub use pixmoji_core::{
    types, Align, Anchor, AsyncFetch, Canvas, Color, Direction, Fetch, FetchError, FetchResponse,
    FontMetrics, PixmojiError, RenderError, RendererConfig, Result, ShapingOptions, TextOptions,
};
pub use pixmoji_source::{AssetSource, AsyncAssetSource, EmojiProvider, EmojiStyle, ProviderConfig};
pub use pixmoji_unicode::{tokenize, EmojiCatalog, Tokenizer};
pub use renderer::{AsyncRenderer, Renderer, RendererBuilder};

#[cfg(feature = "network")]
pub use pixmoji_source::{AsyncHttpFetcher, HttpConfig, HttpFetcher};

/// Everything needed to draw, in one import
pub mod prelude {
    pub use crate::layout::{EmojiGeometry, LayoutPlan};
    pub use crate::{
        Align, Anchor, AsyncRenderer, Canvas, Color, EmojiProvider, EmojiStyle, FontMetrics,
        PixmojiError, ProviderConfig, Renderer, RendererConfig, Result, TextOptions,
    };

    #[cfg(feature = "network")]
    pub use crate::{AsyncHttpFetcher, HttpFetcher};
}
