//! Where emoji images come from
//!
//! A provider is nothing more than a URL rule. Swapping providers never
//! changes caching or fallback behavior.

use std::fmt;
use std::str::FromStr;

use pixmoji_core::types::{hex_codepoints, Token, TokenKind};
use pixmoji_core::{PixmojiError, Result};
use url::form_urlencoded;

pub const EMOJI_CDN_BASE: &str = "https://emojicdn.elk.sh/";
pub const TWEMOJI_BASE: &str = "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/72x72/";
pub const DISCORD_EMOJI_BASE: &str = "https://cdn.discordapp.com/emojis/";

/// Vendor artwork served by the emoji CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EmojiStyle {
    #[default]
    Twitter,
    Apple,
    Google,
    Microsoft,
    Samsung,
    WhatsApp,
    Facebook,
    Messenger,
    JoyPixels,
    Openmoji,
    Emojidex,
    Mozilla,
}

impl EmojiStyle {
    pub const ALL: [EmojiStyle; 12] = [
        Self::Twitter,
        Self::Apple,
        Self::Google,
        Self::Microsoft,
        Self::Samsung,
        Self::WhatsApp,
        Self::Facebook,
        Self::Messenger,
        Self::JoyPixels,
        Self::Openmoji,
        Self::Emojidex,
        Self::Mozilla,
    ];

    /// Twitter's artwork goes by this name too
    pub const TWEMOJI: Self = Self::Twitter;
    pub const FACEBOOK_MESSENGER: Self = Self::Messenger;

    /// Value of the CDN's `style` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Apple => "apple",
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Samsung => "samsung",
            Self::WhatsApp => "whatsapp",
            Self::Facebook => "facebook",
            Self::Messenger => "messenger",
            Self::JoyPixels => "joypixels",
            Self::Openmoji => "openmoji",
            Self::Emojidex => "emojidex",
            Self::Mozilla => "mozilla",
        }
    }
}

impl fmt::Display for EmojiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmojiStyle {
    type Err = PixmojiError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "twemoji" => return Ok(Self::TWEMOJI),
            "facebook_messenger" | "facebookmessenger" => return Ok(Self::FACEBOOK_MESSENGER),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == lowered)
            .ok_or_else(|| PixmojiError::Config(format!("Unknown emoji style: {s:?}")))
    }
}

/// URL rule for Unicode emoji
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EmojiProvider {
    /// `https://emojicdn.elk.sh/<emoji>?style=<style>`
    EmojiCdn(EmojiStyle),
    /// Twemoji PNG assets keyed by code points
    Twemoji,
    /// `base + code points + extension`
    Custom { base: String, extension: String },
}

impl Default for EmojiProvider {
    fn default() -> Self {
        Self::EmojiCdn(EmojiStyle::default())
    }
}

impl EmojiProvider {
    pub fn name(&self) -> String {
        match self {
            Self::EmojiCdn(style) => format!("emojicdn/{style}"),
            Self::Twemoji => "twemoji".to_string(),
            Self::Custom { base, .. } => format!("custom/{base}"),
        }
    }

    pub fn unicode_url(&self, emoji: &str) -> String {
        match self {
            Self::EmojiCdn(style) => {
                let encoded: String = form_urlencoded::byte_serialize(emoji.as_bytes()).collect();
                format!("{EMOJI_CDN_BASE}{encoded}?style={}", style.as_str())
            },
            Self::Twemoji => format!("{TWEMOJI_BASE}{}.png", twemoji_name(emoji)),
            Self::Custom { base, extension } => {
                format!("{base}{}{extension}", hex_codepoints(emoji))
            },
        }
    }
}

/// Twemoji file names drop U+FE0F unless the sequence is ZWJ-joined
fn twemoji_name(emoji: &str) -> String {
    if emoji.contains('\u{200d}') {
        hex_codepoints(emoji)
    } else {
        let stripped: String = emoji.chars().filter(|&c| c != '\u{fe0f}').collect();
        hex_codepoints(&stripped)
    }
}

/// Provider plus the base used for custom emoji ids
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProviderConfig {
    pub provider: EmojiProvider,
    pub custom_emoji_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: EmojiProvider::default(),
            custom_emoji_base: DISCORD_EMOJI_BASE.to_string(),
        }
    }
}

impl From<EmojiProvider> for ProviderConfig {
    fn from(provider: EmojiProvider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }
}

impl From<EmojiStyle> for ProviderConfig {
    fn from(style: EmojiStyle) -> Self {
        EmojiProvider::EmojiCdn(style).into()
    }
}

impl ProviderConfig {
    pub fn custom_url(&self, id: &str) -> String {
        format!("{}{id}.png", self.custom_emoji_base)
    }

    /// URL to fetch for an emoji token; text tokens have none
    pub fn url_for(&self, token: &Token) -> Option<String> {
        match token.kind() {
            TokenKind::Text => None,
            TokenKind::UnicodeEmoji => Some(self.provider.unicode_url(token.content())),
            TokenKind::CustomEmoji => Some(self.custom_url(token.content())),
        }
    }
}
