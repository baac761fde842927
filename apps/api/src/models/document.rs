use std::collections::BTreeSet;

use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};

use crate::matching::normalizer::Normalizer;

/// Identifier used for the job description side of every comparison.
pub const JOB_DESCRIPTION_ID: &str = "job description";

/// A document taking part in one analysis pass.
///
/// Raw text never changes after construction. The normalized form is computed
/// on first use and cached for the lifetime of the document, so one
/// `Document` should only ever be normalized with one `Normalizer`.
#[derive(Debug)]
pub struct Document {
    id: String,
    raw_text: String,
    normalized: OnceCell<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            normalized: OnceCell::new(),
        }
    }

    pub fn job_description(raw_text: impl Into<String>) -> Self {
        Self::new(JOB_DESCRIPTION_ID, raw_text)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn normalized(&self, normalizer: &Normalizer) -> &str {
        self.normalized
            .get_or_init(|| normalizer.normalize(&self.raw_text))
    }
}

/// Outcome of comparing one resume with one job description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub job_id: String,
    pub resume_id: String,
    /// Percentage in [0, 100]. Full precision in memory, 2 decimals on the wire.
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    pub shared_terms: BTreeSet<String>,
}

/// Rounds a percentage to the two decimals used for display.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

pub fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_score(*score))
}
