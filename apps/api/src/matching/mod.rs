// Resume ↔ job description matching.
// Scoring and highlighting run as two separate pipelines; see `engine`.

pub mod engine;
pub mod handlers;
pub mod highlight;
pub mod normalizer;
pub mod ranking;
pub mod stopwords;
pub mod vectorizer;
