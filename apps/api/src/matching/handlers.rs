//! Axum route handlers for the Matching API.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::email::extract_email;
use crate::extraction::{DocumentKind, Upload};
use crate::matching::ranking::{rank_resumes, RankedResume, RankingFailure, RankingReport};
use crate::models::document::{serialize_score, Document, SimilarityResult};
use crate::notify::Invitation;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const DEFAULT_RESUME_ID: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct SharedTermsRequest {
    pub text_a: String,
    pub text_b: String,
}

#[derive(Debug, Serialize)]
pub struct SharedTermsResponse {
    pub terms: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    pub text: String,
    pub terms: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct HighlightResponse {
    pub highlighted: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub job_description: String,
    pub resume_text: String,
    #[serde(default)]
    pub resume_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub result: SimilarityResult,
    pub qualified: bool,
    pub highlighted_job_description: String,
    pub highlighted_resume: String,
}

#[derive(Debug, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub ranked: RankedResume,
    pub qualified: bool,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub job_id: String,
    pub qualified_threshold: f64,
    pub results: Vec<RankedCandidate>,
    pub failures: Vec<RankingFailure>,
}

impl RankResponse {
    fn from_report(report: RankingReport, threshold: f64) -> Self {
        Self {
            analysis_id: report.analysis_id,
            analyzed_at: report.analyzed_at,
            job_id: report.job_id,
            qualified_threshold: threshold,
            results: report
                .results
                .into_iter()
                .map(|ranked| RankedCandidate {
                    qualified: is_qualified(ranked.result.score, threshold),
                    ranked,
                })
                .collect(),
            failures: report.failures,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: String,
    pub kind: Option<DocumentKind>,
    pub text: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub job_description: String,
    pub resume_text: String,
    pub candidate_name: String,
    pub role_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Sent,
    NotQualified,
    NoEmailFound,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    pub qualified: bool,
    pub recipient: Option<String>,
    pub status: InviteStatus,
    pub notifier_backend: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/score
///
/// Relevance of one resume text to one job description. Empty text scores 0.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let score = state
        .engine
        .score(&request.resume_text, &request.job_description);
    Json(ScoreResponse { score })
}

/// POST /api/v1/match/shared-terms
pub async fn handle_shared_terms(
    State(state): State<AppState>,
    Json(request): Json<SharedTermsRequest>,
) -> Json<SharedTermsResponse> {
    let terms = state.engine.shared_terms(&request.text_a, &request.text_b);
    Json(SharedTermsResponse { terms })
}

/// POST /api/v1/match/highlight
pub async fn handle_highlight(
    State(state): State<AppState>,
    Json(request): Json<HighlightRequest>,
) -> Json<HighlightResponse> {
    let highlighted = state.engine.apply_highlight(&request.text, &request.terms);
    Json(HighlightResponse { highlighted })
}

/// POST /api/v1/match/compare
///
/// Side-by-side view: score, shared terms, and both texts with the shared
/// terms highlighted.
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, AppError> {
    let job_description = require_job_description(Some(&request.job_description))?;
    let job = Document::job_description(job_description);
    let resume = Document::new(
        request
            .resume_id
            .unwrap_or_else(|| DEFAULT_RESUME_ID.to_string()),
        request.resume_text,
    );

    let result = state.engine.compare(&job, &resume);
    let highlighted_job_description = state
        .engine
        .apply_highlight(job.raw_text(), &result.shared_terms);
    let highlighted_resume = state
        .engine
        .apply_highlight(resume.raw_text(), &result.shared_terms);

    Ok(Json(CompareResponse {
        qualified: is_qualified(result.score, state.config.qualified_threshold),
        result,
        highlighted_job_description,
        highlighted_resume,
    }))
}

/// POST /api/v1/match/rank (multipart)
///
/// Fields: `job_description` (text) plus one or more resume files. Files that
/// fail extraction are listed under `failures`; the rest are still ranked.
pub async fn handle_rank(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let job_description = require_job_description(form.job_description.as_deref())?;
    if form.uploads.is_empty() {
        return Err(AppError::Validation(
            "at least one resume file is required".to_string(),
        ));
    }

    let resumes = form
        .uploads
        .into_iter()
        .map(|upload| (upload.file_name.clone(), move || upload.extract_text()))
        .collect::<Vec<_>>();
    let report = rank_resumes(
        Arc::clone(&state.engine),
        Arc::new(Document::job_description(job_description)),
        resumes,
    )
    .await;

    Ok(Json(RankResponse::from_report(
        report,
        state.config.qualified_threshold,
    )))
}

/// POST /api/v1/match/extract (multipart)
///
/// Extracts the text and first email address of exactly one uploaded file.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let mut form = read_upload_form(multipart).await?;
    if form.uploads.len() != 1 {
        return Err(AppError::Validation(format!(
            "exactly one file is required, got {}",
            form.uploads.len()
        )));
    }
    let upload = form.uploads.remove(0);
    let kind = upload.kind();
    let file_name = upload.file_name.clone();

    let text = tokio::task::spawn_blocking(move || upload.extract_text())
        .await
        .map_err(|e| anyhow::anyhow!("extraction task for {file_name} failed: {e}"))??;

    Ok(Json(ExtractResponse {
        email: extract_email(&text),
        file_name,
        kind,
        text,
    }))
}

/// POST /api/v1/match/invite
///
/// Applies the qualification threshold and, for qualified candidates with a
/// detectable email address, hands an invitation to the notifier.
pub async fn handle_invite(
    State(state): State<AppState>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, AppError> {
    let job_description = require_job_description(Some(&request.job_description))?;
    if request.candidate_name.trim().is_empty() || request.role_title.trim().is_empty() {
        return Err(AppError::Validation(
            "candidate_name and role_title cannot be empty".to_string(),
        ));
    }

    let score = state.engine.score(&request.resume_text, job_description);
    let qualified = is_qualified(score, state.config.qualified_threshold);
    let recipient = extract_email(&request.resume_text);
    let backend = state.notifier.backend();

    let status = match (&recipient, qualified) {
        (_, false) => InviteStatus::NotQualified,
        (None, true) => InviteStatus::NoEmailFound,
        (Some(address), true) => {
            let invitation = Invitation {
                recipient: address.clone(),
                candidate_name: request.candidate_name.trim().to_string(),
                role_title: request.role_title.trim().to_string(),
            };
            state.notifier.send_invitation(&invitation).await?;
            info!("Invitation sent via {backend} (score {score:.2})");
            InviteStatus::Sent
        }
    };

    Ok(Json(InviteResponse {
        score,
        qualified,
        recipient,
        status,
        notifier_backend: backend,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct UploadForm {
    job_description: Option<String>,
    uploads: Vec<Upload>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty, unnamed part for an untouched file input.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.uploads.push(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None if name == JOB_DESCRIPTION_FIELD => {
                form.job_description = Some(field.text().await?);
            }
            None => debug!("Ignoring multipart field '{name}'"),
        }
    }
    Ok(form)
}

fn require_job_description(text: Option<&str>) -> Result<&str, AppError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        )),
    }
}

/// Qualification is caller policy layered on top of the score.
fn is_qualified(score: f64, threshold: f64) -> bool {
    score >= threshold
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
