//! Renderer defaults
//!
//! Values here apply to every call on a renderer unless the call's
//! [`TextOptions`](crate::TextOptions) overrides them. With the `serde`
//! feature the struct can be read straight out of a JSON or TOML file;
//! missing fields take their defaults.
//!
//! ```
//! use pixmoji_core::RendererConfig;
//!
//! let config = RendererConfig {
//!     emoji_scale_factor: 1.15,
//!     emoji_position_offset: (0, 2),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{PixmojiError, Result};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RendererConfig {
    /// Keep fetched emoji bytes for the lifetime of the renderer
    pub cache: bool,
    /// Resolve custom emoji tags; when off they print as text
    pub render_custom_emoji: bool,
    /// Emoji width as a multiple of the font size
    pub emoji_scale_factor: f32,
    /// Pixel offset applied to every pasted emoji
    pub emoji_position_offset: (i32, i32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cache: true,
            render_custom_emoji: true,
            emoji_scale_factor: 1.0,
            emoji_position_offset: (0, 0),
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.emoji_scale_factor.is_finite() || self.emoji_scale_factor <= 0.0 {
            return Err(PixmojiError::Config(format!(
                "emoji_scale_factor must be a positive number, got {}",
                self.emoji_scale_factor
            )));
        }
        Ok(())
    }
}
