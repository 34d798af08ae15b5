//! Pixmoji Source: turning emoji tokens into bitmaps
//!
//! An asset source pairs a URL rule ([`ProviderConfig`]) with a fetcher and
//! a cache. Lookups never fail: anything that goes wrong on the way (a
//! transport error, a 404, bytes that are not an image) yields an absent
//! bitmap and the token prints as text.
//!
//! ```ignore
//! use pixmoji_source::{AssetSource, EmojiStyle, HttpFetcher};
//! use pixmoji_core::types::Token;
//!
//! let source = AssetSource::new(HttpFetcher::new()?, EmojiStyle::Apple);
//! let wave = source.resolve(&Token::unicode_emoji("👋"));
//! assert!(wave.is_found());
//! ```

pub mod cache;
pub mod provider;
mod source;

#[cfg(feature = "network")]
pub mod http;

pub use cache::{AssetCache, AsyncAssetCache, Miss};
pub use provider::{EmojiProvider, EmojiStyle, ProviderConfig};
pub use source::{AssetSource, AsyncAssetSource};

#[cfg(feature = "network")]
pub use http::{AsyncHttpFetcher, HttpConfig, HttpFetcher};
