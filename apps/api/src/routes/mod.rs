pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Core matching operations
        .route("/api/v1/match/score", post(handlers::handle_score))
        .route(
            "/api/v1/match/shared-terms",
            post(handlers::handle_shared_terms),
        )
        .route("/api/v1/match/highlight", post(handlers::handle_highlight))
        // Resume review workflow
        .route("/api/v1/match/compare", post(handlers::handle_compare))
        .route("/api/v1/match/rank", post(handlers::handle_rank))
        .route("/api/v1/match/extract", post(handlers::handle_extract))
        .route("/api/v1/match/invite", post(handlers::handle_invite))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
