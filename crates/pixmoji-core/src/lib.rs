//! Pixmoji Core: the shared vocabulary of emoji-aware text rendering
//!
//! Text goes in, a canvas comes out with emoji swapped for bitmaps. This
//! crate holds the types every other crate passes around and the traits
//! external collaborators implement.
//!
//! ## The Flow
//!
//! 1. **Tokenize** - raw text splits into lines of [`types::Token`]s
//! 2. **Resolve** - emoji tokens become bitmaps, or stay text when lookup fails
//! 3. **Lay out** - per-line geometry is computed exactly like a plain
//!    multiline text call would compute it
//! 4. **Paint** - [`types::PaintOp`]s are applied to a [`Canvas`]
//!
//! ## The Traits
//!
//! - [`FontMetrics`] - measurement, provided by the font backend
//! - [`Canvas`] - painting, provided by the image backend
//! - [`Fetch`] / [`AsyncFetch`] - network access for emoji assets

pub mod config;
pub mod error;
pub mod options;
pub mod traits;

pub use config::RendererConfig;
pub use error::{FetchError, PixmojiError, RenderError, Result};
pub use options::{
    Align, Anchor, Direction, HorizontalAnchor, ShapingOptions, TextOptions, VerticalAnchor,
};
pub use traits::{AsyncFetch, Canvas, Fetch, FetchResponse, FontMetrics};

/// The data structures that flow between stages
pub mod types {
    use std::fmt;
    use std::sync::Arc;

    use image::RgbaImage;

    /// What a token stands for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum TokenKind {
        Text,
        UnicodeEmoji,
        CustomEmoji,
    }

    /// One classified piece of a line
    ///
    /// For [`TokenKind::CustomEmoji`] the content is the numeric id pulled
    /// out of the tag, not the tag itself.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Token {
        kind: TokenKind,
        content: String,
    }

    impl Token {
        pub fn new(kind: TokenKind, content: impl Into<String>) -> Self {
            Self {
                kind,
                content: content.into(),
            }
        }

        pub fn text(content: impl Into<String>) -> Self {
            Self::new(TokenKind::Text, content)
        }

        pub fn unicode_emoji(content: impl Into<String>) -> Self {
            Self::new(TokenKind::UnicodeEmoji, content)
        }

        pub fn custom_emoji(id: impl Into<String>) -> Self {
            Self::new(TokenKind::CustomEmoji, id)
        }

        pub fn kind(&self) -> TokenKind {
            self.kind
        }

        pub fn content(&self) -> &str {
            &self.content
        }

        pub fn is_emoji(&self) -> bool {
            self.kind != TokenKind::Text
        }
    }

    /// Tokens of one `\n`-delimited segment, in rendering order
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Line {
        tokens: Vec<Token>,
    }

    impl Line {
        pub fn new(tokens: Vec<Token>) -> Self {
            Self { tokens }
        }

        pub fn tokens(&self) -> &[Token] {
            &self.tokens
        }

        pub fn iter(&self) -> std::slice::Iter<'_, Token> {
            self.tokens.iter()
        }

        pub fn len(&self) -> usize {
            self.tokens.len()
        }

        pub fn is_empty(&self) -> bool {
            self.tokens.is_empty()
        }

        pub fn has_emoji(&self) -> bool {
            self.tokens.iter().any(Token::is_emoji)
        }
    }

    impl<'a> IntoIterator for &'a Line {
        type Item = &'a Token;
        type IntoIter = std::slice::Iter<'a, Token>;

        fn into_iter(self) -> Self::IntoIter {
            self.tokens.iter()
        }
    }

    impl From<Vec<Token>> for Line {
        fn from(tokens: Vec<Token>) -> Self {
            Self::new(tokens)
        }
    }

    /// Namespace of an asset lookup key
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum AssetKind {
        Unicode,
        Custom,
    }

    /// Stable identity of an emoji asset, used for caching
    ///
    /// Unicode emoji are keyed by their hyphen-joined lowercase hex code
    /// points (`1f44b`, `1f468-200d-1f4bb`), custom emoji by their id.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct AssetKey {
        pub kind: AssetKind,
        pub key: String,
    }

    impl AssetKey {
        pub fn unicode(emoji: &str) -> Self {
            Self {
                kind: AssetKind::Unicode,
                key: hex_codepoints(emoji),
            }
        }

        pub fn custom(id: impl Into<String>) -> Self {
            Self {
                kind: AssetKind::Custom,
                key: id.into(),
            }
        }

        /// Key for an emoji token; text tokens have none
        pub fn for_token(token: &Token) -> Option<Self> {
            match token.kind() {
                TokenKind::Text => None,
                TokenKind::UnicodeEmoji => Some(Self::unicode(token.content())),
                TokenKind::CustomEmoji => Some(Self::custom(token.content())),
            }
        }
    }

    impl fmt::Display for AssetKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.kind {
                AssetKind::Unicode => write!(f, "unicode:{}", self.key),
                AssetKind::Custom => write!(f, "custom:{}", self.key),
            }
        }
    }

    /// `👋` -> `1f44b`, `👨‍💻` -> `1f468-200d-1f4bb`
    pub fn hex_codepoints(text: &str) -> String {
        text.chars()
            .map(|ch| format!("{:x}", ch as u32))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Outcome of looking an emoji up
    ///
    /// A missing bitmap is the signal to print the token as text.
    #[derive(Debug, Clone)]
    pub struct ResolvedAsset {
        pub identifier: String,
        pub bitmap: Option<Arc<RgbaImage>>,
    }

    impl ResolvedAsset {
        pub fn found(identifier: impl Into<String>, bitmap: Arc<RgbaImage>) -> Self {
            Self {
                identifier: identifier.into(),
                bitmap: Some(bitmap),
            }
        }

        pub fn absent(identifier: impl Into<String>) -> Self {
            Self {
                identifier: identifier.into(),
                bitmap: None,
            }
        }

        pub fn is_found(&self) -> bool {
            self.bitmap.is_some()
        }
    }

    /// A single drawing instruction produced by layout
    #[derive(Debug, Clone)]
    pub enum PaintOp {
        /// A whole line of text, painted in one call
        Text { text: String, origin: (f32, f32) },
        /// An emoji bitmap, already resized to `size`
        Bitmap {
            bitmap: Arc<RgbaImage>,
            origin: (i32, i32),
            size: (u32, u32),
        },
    }
}

/// Simple RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba([color.r, color.g, color.b, color.a])
    }
}
