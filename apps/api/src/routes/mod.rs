pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::document::handlers;
use crate::import::handlers::handle_import;
use crate::scoring::handlers::{handle_score, handle_score_draft};
use crate::state::AppState;

/// Uploaded resumes above this size are rejected before extraction.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // One-shot build
        .route("/api/v1/documents/build", post(handlers::handle_build))
        // Drafts
        .route("/api/v1/documents", post(handlers::handle_create_document))
        .route("/api/v1/documents/:id", get(handlers::handle_get_document))
        .route(
            "/api/v1/documents/:id/augment",
            post(handlers::handle_augment),
        )
        .route("/api/v1/documents/:id/merge", post(handlers::handle_merge))
        .route("/api/v1/documents/:id/export", get(handlers::handle_export))
        .route("/api/v1/documents/:id/score", post(handle_score_draft))
        // Preview
        .route("/api/v1/render", post(handlers::handle_render))
        // ATS scoring
        .route("/api/v1/score", post(handle_score))
        // Import
        .route(
            "/api/v1/import",
            post(handle_import).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
