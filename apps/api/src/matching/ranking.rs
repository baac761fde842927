//! Batch ranking — scores many resumes against one job description.
//!
//! Every resume is loaded and compared on its own blocking task. Units share
//! no mutable state; a failed unit is reported and the rest still finish.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extraction::ExtractionError;
use crate::matching::engine::MatchEngine;
use crate::models::document::{Document, SimilarityResult};

/// A resume that made it through extraction and scoring.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResume {
    pub rank: usize,
    #[serde(flatten)]
    pub result: SimilarityResult,
}

/// A resume that could not be scored.
#[derive(Debug, Clone, Serialize)]
pub struct RankingFailure {
    pub resume_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub job_id: String,
    /// Sorted by score descending, ties broken by resume id.
    pub results: Vec<RankedResume>,
    pub failures: Vec<RankingFailure>,
}

/// Ranks resumes against `job`. Each entry pairs a resume id with a loader
/// that produces its text (typically text extraction of an upload).
pub async fn rank_resumes<F>(
    engine: Arc<MatchEngine>,
    job: Arc<Document>,
    resumes: Vec<(String, F)>,
) -> RankingReport
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    let analysis_id = Uuid::new_v4();
    info!(
        "Ranking {} resume(s) against '{}' (analysis {analysis_id})",
        resumes.len(),
        job.id()
    );

    // Normalize the shared job description once, before fanning out.
    job.normalized(engine.normalizer());

    let handles: Vec<_> = resumes
        .into_iter()
        .map(|(resume_id, load)| {
            let engine = Arc::clone(&engine);
            let job = Arc::clone(&job);
            let task_id = resume_id.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let text = load()?;
                let resume = Document::new(task_id, text);
                Ok::<_, ExtractionError>(engine.compare(&job, &resume))
            });
            (resume_id, handle)
        })
        .collect();

    let mut scored = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for (resume_id, handle) in handles {
        let reason = match handle.await {
            Ok(Ok(result)) => {
                scored.push(result);
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("processing task failed: {e}"),
        };
        warn!("Error processing {resume_id}: {reason}");
        failures.push(RankingFailure { resume_id, reason });
    }

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.resume_id.cmp(&b.resume_id))
    });
    let results = scored
        .into_iter()
        .enumerate()
        .map(|(i, result)| RankedResume { rank: i + 1, result })
        .collect::<Vec<_>>();

    info!(
        "Analysis {analysis_id} finished: {} ranked, {} failed",
        results.len(),
        failures.len()
    );

    RankingReport {
        analysis_id,
        analyzed_at: Utc::now(),
        job_id: job.id().to_string(),
        results,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Loader = Box<dyn FnOnce() -> Result<String, ExtractionError> + Send>;

    const JD: &str = "Senior Rust engineer: distributed systems, Kafka, Kubernetes, PostgreSQL";

    fn text(s: &'static str) -> Loader {
        Box::new(move || Ok(s.to_string()))
    }

    fn batch() -> Vec<(String, Loader)> {
        vec![
            ("zero.pdf".to_string(), text("Pastry chef with a passion for sourdough")),
            (
                "high.pdf".to_string(),
                text("Rust engineer building distributed Kafka pipelines on Kubernetes with PostgreSQL"),
            ),
            ("medium.pdf".to_string(), text("Java engineer, some Kafka")),
        ]
    }

    #[tokio::test]
    async fn test_ranks_high_medium_zero() {
        let report = rank_resumes(
            Arc::new(MatchEngine::default()),
            Arc::new(Document::job_description(JD)),
            batch(),
        )
        .await;

        let order: Vec<&str> = report
            .results
            .iter()
            .map(|r| r.result.resume_id.as_str())
            .collect();
        assert_eq!(order, ["high.pdf", "medium.pdf", "zero.pdf"]);
        assert_eq!(report.results[0].rank, 1);
        assert!(report.results[0].result.score > report.results[1].result.score);
        assert!(report.results[1].result.score > 0.0);
        assert_eq!(report.results[2].result.score, 0.0);
        assert!(report.failures.is_empty());
        assert_eq!(report.job_id, "job description");
    }

    #[tokio::test]
    async fn test_ranking_is_reproducible() {
        let engine = Arc::new(MatchEngine::default());
        let first = rank_resumes(
            Arc::clone(&engine),
            Arc::new(Document::job_description(JD)),
            batch(),
        )
        .await;
        let mut reversed = batch();
        reversed.reverse();
        let second = rank_resumes(engine, Arc::new(Document::job_description(JD)), reversed).await;

        let scores = |r: &RankingReport| {
            r.results
                .iter()
                .map(|x| (x.result.resume_id.clone(), x.result.score))
                .collect::<Vec<_>>()
        };
        assert_eq!(scores(&first), scores(&second));
        assert_ne!(first.analysis_id, second.analysis_id);
    }

    #[tokio::test]
    async fn test_failed_extraction_does_not_abort_batch() {
        let mut resumes = batch();
        resumes.push((
            "broken.pdf".to_string(),
            Box::new(|| -> Result<String, ExtractionError> {
                Err(ExtractionError::Pdf("bad xref table".to_string()))
            }),
        ));
        let report = rank_resumes(
            Arc::new(MatchEngine::default()),
            Arc::new(Document::job_description(JD)),
            resumes,
        )
        .await;

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].resume_id, "broken.pdf");
        assert!(report.failures[0].reason.contains("bad xref table"));
    }

    #[tokio::test]
    async fn test_panicking_unit_is_reported() {
        let resumes: Vec<(String, Loader)> = vec![
            ("ok.txt".to_string(), text("Rust Kafka")),
            (
                "panics.pdf".to_string(),
                Box::new(|| -> Result<String, ExtractionError> { panic!("decoder blew up") }),
            ),
        ];
        let report = rank_resumes(
            Arc::new(MatchEngine::default()),
            Arc::new(Document::job_description(JD)),
            resumes,
        )
        .await;
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures[0].resume_id, "panics.pdf");
    }
}
