//! Similarity & Overlap Engine.
//!
//! Two independent pipelines share this type:
//! - scoring: normalizer output → TF-IDF without stopwords → cosine × 100
//! - highlighting: raw text → TF-IDF with the vectorizer stopword list →
//!   terms weighted in both documents
//!
//! They produce different vocabularies on purpose; keep them separate.

use std::collections::BTreeSet;

use tracing::debug;

use crate::matching::highlight::Highlighter;
use crate::matching::normalizer::Normalizer;
use crate::matching::stopwords::StopWords;
use crate::matching::vectorizer::{cosine_similarity, TfidfVectorizer, VectorizeError};
use crate::models::document::{Document, SimilarityResult};

#[derive(Debug, Clone)]
pub struct MatchEngine {
    normalizer: Normalizer,
    scoring: TfidfVectorizer,
    highlighting: TfidfVectorizer,
    highlighter: Highlighter,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(Normalizer::default(), Highlighter::default())
    }
}

impl MatchEngine {
    pub fn new(normalizer: Normalizer, highlighter: Highlighter) -> Self {
        Self {
            normalizer,
            scoring: TfidfVectorizer::new(StopWords::none()),
            highlighting: TfidfVectorizer::new(StopWords::vectorizer_english()),
            highlighter,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Relevance of a resume to a job description, as a percentage in [0, 100].
    pub fn score(&self, resume_text: &str, job_text: &str) -> f64 {
        let resume = self.normalizer.normalize(resume_text);
        let job = self.normalizer.normalize(job_text);
        self.score_normalized(&resume, &job)
    }

    /// Same as [`MatchEngine::score`] for text that is already normalized.
    pub fn score_normalized(&self, resume: &str, job: &str) -> f64 {
        let matrix = match self.scoring.fit_transform(&[resume, job]) {
            Ok(matrix) => matrix,
            Err(VectorizeError::EmptyVocabulary) => {
                debug!("Scoring corpus has an empty vocabulary; score is 0");
                return 0.0;
            }
        };
        match (matrix.row(0), matrix.row(1)) {
            (Some(a), Some(b)) => (cosine_similarity(a, b).clamp(0.0, 1.0)) * 100.0,
            _ => 0.0,
        }
    }

    /// Terms with non-zero weight in both raw texts, lower-cased.
    pub fn shared_terms(&self, text_a: &str, text_b: &str) -> BTreeSet<String> {
        let matrix = match self.highlighting.fit_transform(&[text_a, text_b]) {
            Ok(matrix) => matrix,
            Err(VectorizeError::EmptyVocabulary) => return BTreeSet::new(),
        };
        let (Some(a), Some(b)) = (matrix.row(0), matrix.row(1)) else {
            return BTreeSet::new();
        };

        let shared: BTreeSet<String> = matrix
            .vocabulary()
            .iter()
            .zip(a.iter().zip(b))
            .filter(|(_, (wa, wb))| **wa > 0.0 && **wb > 0.0)
            .map(|(term, _)| term.clone())
            .collect();
        debug!(
            "Shared terms: {} of {} vocabulary terms",
            shared.len(),
            matrix.vocabulary().len()
        );
        shared
    }

    /// Wraps occurrences of `terms` in `text` with `<mark>` annotations.
    pub fn apply_highlight(&self, text: &str, terms: &BTreeSet<String>) -> String {
        self.highlighter.apply(text, terms)
    }

    /// Scores one resume against a job description and collects the shared
    /// terms. Normalized text is taken from (and cached on) the documents.
    pub fn compare(&self, job: &Document, resume: &Document) -> SimilarityResult {
        let score = self.score_normalized(
            resume.normalized(&self.normalizer),
            job.normalized(&self.normalizer),
        );
        SimilarityResult {
            job_id: job.id().to_string(),
            resume_id: resume.id().to_string(),
            score,
            shared_terms: self.shared_terms(job.raw_text(), resume.raw_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Looking for a Python developer with Django experience";
    const RESUME: &str = "Experienced Python developer skilled in Django and REST APIs";

    #[test]
    fn test_end_to_end_partial_overlap() {
        let engine = MatchEngine::default();
        let score = engine.score(RESUME, JD);
        assert!(score > 0.0 && score < 100.0, "score was {score}");

        let shared = engine.shared_terms(JD, RESUME);
        for term in ["python", "developer", "django"] {
            assert!(shared.contains(term), "missing {term} in {shared:?}");
        }
        assert!(!shared.contains("experience"));
    }

    #[test]
    fn test_score_is_symmetric() {
        let engine = MatchEngine::default();
        let pairs = [
            (RESUME, JD),
            ("rust kafka aws rust", "kafka postgres"),
            ("Senior Go engineer", "Go, Rust, and C++ engineers wanted"),
        ];
        for (a, b) in pairs {
            assert!((engine.score(a, b) - engine.score(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let engine = MatchEngine::default();
        for text in [JD, RESUME, "rust rust rust kafka"] {
            assert!((engine.score(text, text) - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let engine = MatchEngine::default();
        assert_eq!(engine.score("", JD), 0.0);
        assert_eq!(engine.score(JD, ""), 0.0);
        assert_eq!(engine.score("", ""), 0.0);
        assert_eq!(engine.score("the and of", "!!! 42"), 0.0);
    }

    #[test]
    fn test_disjoint_vocabularies_score_zero() {
        let engine = MatchEngine::default();
        assert_eq!(engine.score("rust kafka", "painter sculptor"), 0.0);
    }

    #[test]
    fn test_shared_terms_symmetric_and_degenerate() {
        let engine = MatchEngine::default();
        assert_eq!(engine.shared_terms(JD, RESUME), engine.shared_terms(RESUME, JD));
        assert!(engine.shared_terms("", RESUME).is_empty());
        assert!(engine.shared_terms("the and", "of the").is_empty());
    }

    #[test]
    fn test_shared_terms_are_tokens_of_both_inputs() {
        let engine = MatchEngine::default();
        let a = "Built ETL pipelines in Python; 5 years of AWS.";
        let b = "We need AWS and python ETL skills";
        let shared = engine.shared_terms(a, b);
        let vectorizer = TfidfVectorizer::default();
        let tokens_a: BTreeSet<String> = vectorizer.analyze(a).into_iter().collect();
        let tokens_b: BTreeSet<String> = vectorizer.analyze(b).into_iter().collect();
        assert!(!shared.is_empty());
        for term in &shared {
            assert!(tokens_a.contains(term) && tokens_b.contains(term));
        }
    }

    #[test]
    fn test_highlighting_vocabulary_differs_from_scoring() {
        // "system" counts for scoring but is never highlighted
        let engine = MatchEngine::default();
        assert!(engine.score("system", "system") > 99.0);
        assert!(engine.shared_terms("system", "system").is_empty());
    }

    #[test]
    fn test_compare_builds_result() {
        let engine = MatchEngine::default();
        let job = Document::job_description(JD);
        let resume = Document::new("cv.docx", RESUME);
        let result = engine.compare(&job, &resume);
        assert_eq!(result.job_id, "job description");
        assert_eq!(result.resume_id, "cv.docx");
        assert!((result.score - engine.score(RESUME, JD)).abs() < 1e-12);
        assert!(result.shared_terms.contains("django"));
    }
}
