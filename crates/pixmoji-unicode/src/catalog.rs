// this_file: crates/pixmoji-unicode/src/catalog.rs

//! The set of emoji sequences the tokenizer recognizes.
//!
//! The global catalog is built once from the `emojis` table (every emoji
//! plus its skin-tone variants) and never mutated afterwards.

use std::collections::HashSet;
use std::sync::OnceLock;

static GLOBAL: OnceLock<EmojiCatalog> = OnceLock::new();

/// Known emoji sequences, longest first.
#[derive(Debug, Clone)]
pub struct EmojiCatalog {
    sequences: Vec<String>,
    lookup: HashSet<String>,
}

impl EmojiCatalog {
    /// Process-wide catalog of standard Unicode emoji.
    pub fn global() -> &'static EmojiCatalog {
        GLOBAL.get_or_init(|| {
            let mut all = Vec::new();
            for emoji in emojis::iter() {
                all.push(emoji.as_str());
                if let Some(tones) = emoji.skin_tones() {
                    all.extend(tones.map(|tone| tone.as_str()));
                }
            }
            let catalog = Self::from_sequences(all);
            log::debug!("Emoji catalog initialised with {} sequences", catalog.len());
            catalog
        })
    }

    /// Build a catalog from arbitrary sequences.
    ///
    /// Empty strings and duplicates are dropped. Sequences are ordered by
    /// code point count, longest first, so a multi-code-point emoji wins over
    /// any shorter prefix that is also in the set.
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lookup = HashSet::new();
        let mut ordered = Vec::new();

        for sequence in sequences {
            let sequence = sequence.into();
            if sequence.is_empty() {
                continue;
            }
            if lookup.insert(sequence.clone()) {
                ordered.push(sequence);
            }
        }

        ordered.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.cmp(b))
        });

        Self {
            sequences: ordered,
            lookup,
        }
    }

    pub fn contains(&self, sequence: &str) -> bool {
        self.lookup.contains(sequence)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sequences in match-priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(String::as_str)
    }

    /// Regex alternation of every sequence, escaped, in priority order.
    pub fn alternation(&self) -> String {
        self.sequences
            .iter()
            .map(|sequence| regex::escape(sequence))
            .collect::<Vec<_>>()
            .join("|")
    }
}
