//! How a block of text should be placed and styled
//!
//! Anchor and alignment codes follow the multiline text conventions of
//! raster drawing libraries: a two-letter anchor picks the reference point of
//! the whole block, `align` justifies each line inside the block.

use std::fmt;
use std::str::FromStr;

use crate::error::{PixmojiError, Result};
use crate::Color;

/// Horizontal half of an anchor code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAnchor {
    /// `l`
    #[default]
    Left,
    /// `m`
    Middle,
    /// `r`
    Right,
    /// `s`, only meaningful for vertical text
    Start,
}

/// Vertical half of an anchor code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAnchor {
    /// `a`
    #[default]
    Ascender,
    /// `t`
    Top,
    /// `m`
    Middle,
    /// `s`
    Baseline,
    /// `b`
    Bottom,
    /// `d`
    Descender,
}

/// Two-character anchor such as `la` or `ma`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Anchor {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Anchor {
    pub const fn new(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The code as the two characters a canvas backend expects
    pub fn code(&self) -> [char; 2] {
        let h = match self.horizontal {
            HorizontalAnchor::Left => 'l',
            HorizontalAnchor::Middle => 'm',
            HorizontalAnchor::Right => 'r',
            HorizontalAnchor::Start => 's',
        };
        let v = match self.vertical {
            VerticalAnchor::Ascender => 'a',
            VerticalAnchor::Top => 't',
            VerticalAnchor::Middle => 'm',
            VerticalAnchor::Baseline => 's',
            VerticalAnchor::Bottom => 'b',
            VerticalAnchor::Descender => 'd',
        };
        [h, v]
    }
}

impl FromStr for Anchor {
    type Err = PixmojiError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PixmojiError::InvalidAnchor(s.to_string());
        let mut chars = s.chars();
        let (Some(h), Some(v), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let horizontal = match h {
            'l' => HorizontalAnchor::Left,
            'm' => HorizontalAnchor::Middle,
            'r' => HorizontalAnchor::Right,
            's' => HorizontalAnchor::Start,
            _ => return Err(invalid()),
        };
        let vertical = match v {
            'a' => VerticalAnchor::Ascender,
            't' => VerticalAnchor::Top,
            'm' => VerticalAnchor::Middle,
            's' => VerticalAnchor::Baseline,
            'b' => VerticalAnchor::Bottom,
            'd' => VerticalAnchor::Descender,
            _ => return Err(invalid()),
        };

        Ok(Self::new(horizontal, vertical))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h, v] = self.code();
        write!(f, "{h}{v}")
    }
}

/// Per-line justification inside a multiline block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = PixmojiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(PixmojiError::InvalidAlign(other.to_string())),
        }
    }
}

/// Which way the text flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
    TopToBottom,
}

impl FromStr for Direction {
    type Err = PixmojiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ltr" => Ok(Self::LeftToRight),
            "rtl" => Ok(Self::RightToLeft),
            "ttb" => Ok(Self::TopToBottom),
            other => Err(PixmojiError::InvalidDirection(other.to_string())),
        }
    }
}

/// Options forwarded untouched to the font collaborator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapingOptions {
    pub direction: Option<Direction>,
    /// OpenType feature strings such as `"-liga"`
    pub features: Vec<String>,
    pub language: Option<String>,
}

/// Everything `draw_text` needs besides the position and the text
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// `None` paints with the canvas default ink
    pub fill: Option<Color>,
    /// `None` behaves like `la`
    pub anchor: Option<Anchor>,
    /// Pixels between lines
    pub spacing: f32,
    /// Pixels added after every token
    pub node_spacing: f32,
    pub align: Align,
    pub shaping: ShapingOptions,
    pub stroke_width: u32,
    pub stroke_fill: Option<Color>,
    pub embedded_color: bool,
    /// Overrides the renderer default when set
    pub emoji_scale_factor: Option<f32>,
    /// Overrides the renderer default when set
    pub emoji_position_offset: Option<(i32, i32)>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            fill: None,
            anchor: None,
            spacing: 4.0,
            node_spacing: 0.0,
            align: Align::Left,
            shaping: ShapingOptions::default(),
            stroke_width: 0,
            stroke_fill: None,
            embedded_color: false,
            emoji_scale_factor: None,
            emoji_position_offset: None,
        }
    }
}

impl TextOptions {
    /// Anchor with the `la` default applied
    pub fn effective_anchor(&self) -> Anchor {
        self.anchor.unwrap_or_default()
    }

    /// Whether painting produces visible ink
    ///
    /// A missing fill means the canvas default ink, which is opaque.
    pub fn has_visible_fill(&self) -> bool {
        self.fill.map_or(true, |color| color.a > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_parses_every_valid_code() {
        for h in ['l', 'm', 'r', 's'] {
            for v in ['a', 't', 'm', 's', 'b', 'd'] {
                let code = format!("{h}{v}");
                let anchor: Anchor = code.parse().unwrap();
                assert_eq!(anchor.to_string(), code);
            }
        }
    }

    #[test]
    fn anchor_rejects_wrong_length_and_codes() {
        for bad in ["", "l", "lam", "xa", "lx", "LA"] {
            assert!(
                matches!(bad.parse::<Anchor>(), Err(PixmojiError::InvalidAnchor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn default_anchor_is_left_ascender() {
        assert_eq!(TextOptions::default().effective_anchor().to_string(), "la");
    }

    #[test]
    fn align_rejects_unknown_values() {
        assert_eq!("center".parse::<Align>().unwrap(), Align::Center);
        match "justify".parse::<Align>() {
            Err(PixmojiError::InvalidAlign(value)) => assert_eq!(value, "justify"),
            other => panic!("expected InvalidAlign, got {other:?}"),
        }
    }

    #[test]
    fn transparent_fill_is_not_visible() {
        let mut options = TextOptions::default();
        assert!(options.has_visible_fill());

        options.fill = Some(Color::rgba(0, 0, 0, 0));
        assert!(!options.has_visible_fill());
    }
}
