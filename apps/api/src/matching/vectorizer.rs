//! TF-IDF vectorizer over a small in-request corpus.
//!
//! Tokenization: lower-case, then every run of two or more Unicode word
//! characters. Weights: raw counts × smoothed IDF, rows L2-normalized.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::matching::stopwords::StopWords;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizeError {
    #[error("empty vocabulary: documents contain no tokens or only stop words")]
    EmptyVocabulary,
}

#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    stopwords: StopWords,
}

/// Fitted vocabulary plus one weight row per corpus document.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfidfVectorizer {
    pub fn new(stopwords: StopWords) -> Self {
        Self { stopwords }
    }

    /// Splits a document into the terms this vectorizer counts.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.stopwords.contains(token))
            .map(str::to_string)
            .collect()
    }

    pub fn fit_transform(&self, corpus: &[&str]) -> Result<TfidfMatrix, VectorizeError> {
        let counts: Vec<BTreeMap<String, usize>> = corpus
            .iter()
            .map(|doc| {
                let mut tf = BTreeMap::new();
                for term in self.analyze(doc) {
                    *tf.entry(term).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let vocabulary: Vec<String> = counts
            .iter()
            .flat_map(|tf| tf.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if vocabulary.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let n_docs = corpus.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|tf| tf.contains_key(term)).count() as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = counts
            .iter()
            .map(|tf| {
                let mut row: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, idf)| tf.get(term).copied().unwrap_or(0) as f64 * idf)
                    .collect();
                let norm = l2_norm(&row);
                if norm > 0.0 {
                    row.iter_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect();

        Ok(TfidfMatrix { vocabulary, rows })
    }
}

impl TfidfMatrix {
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine of the angle between two vectors; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_drops_single_characters() {
        let vectorizer = TfidfVectorizer::default();
        assert_eq!(
            vectorizer.analyze("A C# dev, 10 years"),
            vec!["dev".to_string(), "10".to_string(), "years".to_string()]
        );
    }

    #[test]
    fn test_analyze_applies_stopwords() {
        let vectorizer = TfidfVectorizer::new(StopWords::vectorizer_english());
        assert_eq!(
            vectorizer.analyze("Python with the Django system"),
            vec!["python".to_string(), "django".to_string()]
        );
    }

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["rust kafka rust", "kafka aws"])
            .unwrap();
        assert_eq!(matrix.vocabulary(), ["aws", "kafka", "rust"]);
    }

    #[test]
    fn test_smoothed_idf_weights() {
        // "shared" appears in both docs: idf 1.0; "solo" in one: ln(3/2) + 1
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["shared solo", "shared"])
            .unwrap();
        let row = matrix.row(0).unwrap();
        let solo_idf = (3.0_f64 / 2.0).ln() + 1.0;
        let norm = (1.0 + solo_idf * solo_idf).sqrt();
        assert!((row[0] - 1.0 / norm).abs() < 1e-12);
        assert!((row[1] - solo_idf / norm).abs() < 1e-12);
        assert_eq!(matrix.row(1).unwrap(), [1.0, 0.0]);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let vectorizer = TfidfVectorizer::new(StopWords::vectorizer_english());
        assert_eq!(
            vectorizer.fit_transform(&["", "the and of"]).unwrap_err(),
            VectorizeError::EmptyVocabulary
        );
    }

    #[test]
    fn test_one_empty_document_yields_zero_row() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["rust", ""])
            .unwrap();
        assert_eq!(matrix.row(1).unwrap(), [0.0]);
        assert_eq!(cosine_similarity(matrix.row(0).unwrap(), matrix.row(1).unwrap()), 0.0);
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
