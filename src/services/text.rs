//! Text normalization shared by every path that feeds the embedding model.
//!
//! Catalog texts, favorites and mood queries all go through [`normalize`] so the
//! embedder always compares stems against stems.

use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Reduces free text to a space-separated stream of lowercase word stems.
///
/// Surrounding punctuation is trimmed from each whitespace-delimited token before
/// stemming; tokens that are pure punctuation are dropped.
pub fn normalize(text: &str) -> String {
    let stemmer = stemmer();
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|word| stemmer.stem(&word.to_lowercase()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Lowercased token stream supporting whole-word and multi-word phrase lookups.
///
/// "science-fiction" and "Science Fiction" both contain the phrase "science fiction",
/// while "warm" does not contain "war".
#[derive(Debug, Clone)]
pub struct WordSequence {
    padded: String,
}

impl WordSequence {
    pub fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", tokenize(text).join(" ")),
        }
    }

    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let needle = tokenize(phrase).join(" ");
        if needle.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {} ", needle))
    }
}
