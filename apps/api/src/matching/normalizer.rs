//! Text Normalizer — turns extracted document text into the canonical token
//! stream the scoring vectorizer consumes.

use unicode_segmentation::UnicodeSegmentation;

use crate::matching::stopwords::StopWords;

/// Lower-cases, strips everything but ASCII letters and whitespace, splits on
/// word boundaries and drops stopwords.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: StopWords,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(StopWords::normalizer_english())
    }
}

impl Normalizer {
    pub fn new(stopwords: StopWords) -> Self {
        Self { stopwords }
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// Normalized tokens in their original relative order.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        // Stripped characters are removed, not replaced: "c++/rust" -> "crust".
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();

        cleaned
            .unicode_words()
            .filter(|token| !self.stopwords.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Tokens rejoined with single spaces. Empty input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}
