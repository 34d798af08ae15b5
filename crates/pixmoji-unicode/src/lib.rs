//! Emoji tokenization: a line of text becomes text runs, Unicode emoji and
//! custom emoji tags
//!
//! Matching is done with one compiled regex: every catalog sequence,
//! longest first, followed by the custom tag pattern. At each position the
//! earliest listed alternative wins, so `👨‍💻` beats `👨` and `💻`.
//!
//! ```
//! use pixmoji_core::types::TokenKind;
//! use pixmoji_unicode::Tokenizer;
//!
//! let lines = Tokenizer::global().tokenize("hi 👋\n<:wave:123456789012345678>");
//! assert_eq!(lines.len(), 2);
//! assert_eq!(lines[0].tokens()[1].kind(), TokenKind::UnicodeEmoji);
//! assert_eq!(lines[1].tokens()[0].content(), "123456789012345678");
//! ```

use std::sync::OnceLock;

use pixmoji_core::types::{Line, Token};
use regex::{Regex, RegexBuilder};

mod catalog;

pub use catalog::EmojiCatalog;

/// `<:name:id>` or `<a:name:id>`, 2-32 name characters, 17-22 digit id
pub const CUSTOM_EMOJI_PATTERN: &str = r"<a?:[a-zA-Z0-9_]{2,32}:(?P<custom>[0-9]{17,22})>";

// The full catalog alternation is a few hundred KB of pattern text.
const REGEX_SIZE_LIMIT: usize = 1 << 27;

static GLOBAL: OnceLock<Tokenizer> = OnceLock::new();

/// Splits text into [`Line`]s of tokens
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Tokenizer over the global [`EmojiCatalog`], compiled on first use
    #[allow(clippy::expect_used)]
    pub fn global() -> &'static Tokenizer {
        GLOBAL.get_or_init(|| {
            Self::from_catalog(EmojiCatalog::global())
                .expect("escaped catalog literals always form a valid pattern")
        })
    }

    /// Build a tokenizer recognizing the sequences in `catalog`
    pub fn from_catalog(catalog: &EmojiCatalog) -> Result<Self, regex::Error> {
        let source = if catalog.is_empty() {
            CUSTOM_EMOJI_PATTERN.to_string()
        } else {
            format!("(?P<emoji>{})|{}", catalog.alternation(), CUSTOM_EMOJI_PATTERN)
        };

        let pattern = RegexBuilder::new(&source)
            .size_limit(REGEX_SIZE_LIMIT)
            .dfa_size_limit(REGEX_SIZE_LIMIT)
            .build()?;

        log::debug!(
            "Compiled emoji tokenizer over {} sequences",
            catalog.len()
        );
        Ok(Self { pattern })
    }

    /// Shorthand for a tokenizer over a handful of sequences
    pub fn with_sequences<I, S>(sequences: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_catalog(&EmojiCatalog::from_sequences(sequences))
    }

    /// Lazily tokenize `text`, one [`Line`] per `\n`-separated segment
    ///
    /// The iterator is `Clone`, so the sequence can be walked again from the
    /// start; every walk yields the same lines.
    pub fn lines<'t, 's>(&'t self, text: &'s str) -> Lines<'t, 's> {
        Lines {
            tokenizer: self,
            segments: text.split('\n'),
        }
    }

    /// Eagerly tokenize `text`
    pub fn tokenize(&self, text: &str) -> Vec<Line> {
        self.lines(text).collect()
    }

    /// Tokenize a single line; `line` must not contain `\n`
    pub fn tokenize_line(&self, line: &str) -> Line {
        let mut tokens = Vec::new();
        let mut cursor = 0;

        for captures in self.pattern.captures_iter(line) {
            let Some(whole) = captures.get(0) else {
                continue;
            };

            if whole.start() > cursor {
                tokens.push(Token::text(&line[cursor..whole.start()]));
            }

            match captures.name("custom") {
                Some(id) => tokens.push(Token::custom_emoji(id.as_str())),
                None => tokens.push(Token::unicode_emoji(whole.as_str())),
            }
            cursor = whole.end();
        }

        if cursor < line.len() {
            tokens.push(Token::text(&line[cursor..]));
        }

        Line::new(tokens)
    }
}

/// Restartable iterator over the lines of a text
#[derive(Debug, Clone)]
pub struct Lines<'t, 's> {
    tokenizer: &'t Tokenizer,
    segments: std::str::Split<'s, char>,
}

impl Iterator for Lines<'_, '_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        self.segments
            .next()
            .map(|segment| self.tokenizer.tokenize_line(segment))
    }
}

/// Tokenize with the global tokenizer
pub fn tokenize(text: &str) -> Vec<Line> {
    Tokenizer::global().tokenize(text)
}

#[cfg(test)]
mod proptests;
